//! Index artifact loading
//!
//! Every load re-reads from disk; nothing is cached between calls.

use crate::error::{Result, SearchError};
use loredex_types::{MasterIndex, Resource, ResourceKind, MASTER_INDEX_FILE};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the master index from `index_dir`.
///
/// # Errors
/// [`SearchError::IndexMissing`] if no build has produced the artifact
/// yet; [`SearchError::Json`] if it cannot be parsed.
pub fn load_master(index_dir: &Path) -> Result<MasterIndex> {
    let path = index_dir.join(MASTER_INDEX_FILE);
    let body = read_artifact(&path)?;
    debug!("Loaded master index from {:?}", path);
    Ok(serde_json::from_str(&body)?)
}

/// Load one standalone per-kind index from `index_dir`.
///
/// # Errors
/// Same failure modes as [`load_master`].
pub fn load_kind(index_dir: &Path, kind: ResourceKind) -> Result<Vec<Resource>> {
    let path = index_dir.join(kind.index_file_name());
    let body = read_artifact(&path)?;
    debug!("Loaded {} index from {:?}", kind, path);
    Ok(serde_json::from_str(&body)?)
}

fn read_artifact(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(body) => Ok(body),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SearchError::IndexMissing {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}
