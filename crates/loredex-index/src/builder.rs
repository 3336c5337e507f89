//! Index builder
//!
//! Runs the four scanners and persists one master index plus four
//! per-kind indexes. Safe to re-run arbitrarily often: the same
//! resource set produces byte-identical resource lists, only
//! `generatedAt` moves. Artifacts are published via temp-file plus
//! rename so a concurrent reader never sees a half-written file.

use crate::scanner::ResourceScanner;
use anyhow::{Context, Result};
use chrono::Utc;
use loredex_types::{IndexStats, MasterIndex, ResourceKind, MASTER_INDEX_FILE};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Diagnostic outcome of a build run.
///
/// Reporting only; a build that returns a report succeeded regardless
/// of what the numbers say.
#[derive(Debug, Clone, Copy)]
pub struct BuildReport {
    /// Per-kind and total resource counts
    pub stats: IndexStats,
    /// Sum of all indexed documents' byte lengths
    pub total_content_bytes: u64,
    /// Serialized size of the master index artifact
    pub master_index_bytes: u64,
}

impl BuildReport {
    /// How much smaller the index is than the content it describes
    pub fn savings_percent(&self) -> f64 {
        if self.total_content_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.master_index_bytes as f64 / self.total_content_bytes as f64) * 100.0
    }
}

/// Builds and persists index snapshots
pub struct IndexBuilder {
    scanner: ResourceScanner,
    output_dir: PathBuf,
}

impl IndexBuilder {
    /// Create a builder writing artifacts into `output_dir`
    pub fn new(scanner: ResourceScanner, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            scanner,
            output_dir: output_dir.into(),
        }
    }

    /// Scan all kinds and write the five index artifacts.
    ///
    /// # Errors
    /// Fails if the output directory cannot be created or any artifact
    /// cannot be written; a partial artifact set must not be trusted
    /// and the build must be re-run.
    pub fn build(&self) -> Result<BuildReport> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create index directory {:?}", self.output_dir)
        })?;

        info!("Building resource index into {:?}", self.output_dir);

        let resources = self.scanner.scan_all();
        for kind in ResourceKind::ALL {
            info!(
                "Indexed {} {}(s)",
                resources.by_kind(kind).len(),
                kind
            );
        }

        let total_content_bytes: u64 = resources.iter().map(|r| r.size).sum();
        let master = MasterIndex::new(resources, Utc::now());

        let master_index_bytes = self.write_artifact(MASTER_INDEX_FILE, &master)?;
        for kind in ResourceKind::ALL {
            self.write_artifact(kind.index_file_name(), master.resources.by_kind(kind))?;
        }

        let report = BuildReport {
            stats: master.stats,
            total_content_bytes,
            master_index_bytes,
        };
        info!(
            "Index built: {} resources, {:.2} KB content, {:.2} KB index ({:.1}% savings)",
            report.stats.total_resources,
            report.total_content_bytes as f64 / 1024.0,
            report.master_index_bytes as f64 / 1024.0,
            report.savings_percent()
        );

        Ok(report)
    }

    /// Serialize one artifact and publish it atomically, returning its
    /// serialized size.
    fn write_artifact<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<u64> {
        let body = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialize {file_name}"))?;

        let final_path = self.output_dir.join(file_name);
        let tmp_path = self.output_dir.join(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, &body)
            .with_context(|| format!("Failed to write index artifact {tmp_path:?}"))?;
        fs::rename(&tmp_path, &final_path)
            .with_context(|| format!("Failed to publish index artifact {final_path:?}"))?;

        Ok(body.len() as u64)
    }

    /// Where this builder publishes artifacts
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
