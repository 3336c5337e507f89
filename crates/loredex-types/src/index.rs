use crate::resource::{Resource, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File name of the master index artifact
pub const MASTER_INDEX_FILE: &str = "master-index.json";

/// Aggregate counters persisted with the master index.
/// Diagnostic only; never gates success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_resources: usize,
    pub skills: usize,
    pub agents: usize,
    pub prompts: usize,
    pub instructions: usize,
}

/// The four per-kind resource collections, in fixed kind order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    pub skills: Vec<Resource>,
    pub agents: Vec<Resource>,
    pub prompts: Vec<Resource>,
    pub instructions: Vec<Resource>,
}

impl ResourceSet {
    /// Entries of one kind
    pub fn by_kind(&self, kind: ResourceKind) -> &[Resource] {
        match kind {
            ResourceKind::Skill => &self.skills,
            ResourceKind::Agent => &self.agents,
            ResourceKind::Prompt => &self.prompts,
            ResourceKind::Instruction => &self.instructions,
        }
    }

    /// All entries, skills first, in scan order within each kind
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.skills
            .iter()
            .chain(self.agents.iter())
            .chain(self.prompts.iter())
            .chain(self.instructions.iter())
    }

    /// Total entry count across kinds
    pub fn len(&self) -> usize {
        self.skills.len() + self.agents.len() + self.prompts.len() + self.instructions.len()
    }

    /// True if no kind has any entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The persisted master index: one immutable snapshot per build.
/// A fresh build replaces the previous snapshot wholesale; nothing is
/// mutated in place after writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterIndex {
    pub generated_at: DateTime<Utc>,
    pub stats: IndexStats,
    pub resources: ResourceSet,
}

impl MasterIndex {
    /// Assemble a snapshot from scanned collections, computing stats
    pub fn new(resources: ResourceSet, generated_at: DateTime<Utc>) -> Self {
        let stats = IndexStats {
            total_resources: resources.len(),
            skills: resources.skills.len(),
            agents: resources.agents.len(),
            prompts: resources.prompts.len(),
            instructions: resources.instructions.len(),
        };
        Self {
            generated_at,
            stats,
            resources,
        }
    }
}
