//! The resource catalog: filter, ranked search, lookup, stats
//!
//! All operations work on a loaded snapshot. Body content is read
//! just-in-time from each entry's `path`; a dangling path is a
//! recoverable [`SearchError::ResourceUnavailable`], never a crash,
//! and metadata-only operations on the same entry keep working.

use crate::error::{Result, SearchError};
use crate::loader;
use chrono::{DateTime, Utc};
use loredex_types::{IndexStats, MasterIndex, Resource, ResourceKind};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default number of search results
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Search filters and limits
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Restrict matches to one kind
    pub kind: Option<ResourceKind>,
    /// Keep entries carrying at least one of these tags; empty means
    /// no tag filtering
    pub tags: Vec<String>,
    /// Maximum number of results
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            kind: None,
            tags: Vec::new(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// A resource with its full body attached
#[derive(Debug, Clone, Serialize)]
pub struct LoadedResource {
    /// The index entry
    #[serde(flatten)]
    pub resource: Resource,
    /// Full body read from the backing document
    pub content: String,
}

/// Persisted counters plus the snapshot timestamp
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Per-kind and total counts
    #[serde(flatten)]
    pub stats: IndexStats,
    /// When the snapshot was built
    pub generated_at: DateTime<Utc>,
}

/// Ranking tier of one match; lower is better
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
enum MatchTier {
    ExactName,
    NameContains,
    DescriptionOnly,
}

/// A loaded index snapshot plus the root resource paths resolve
/// against. Read-only: a rebuild produces a new catalog, never mutates
/// this one.
pub struct ResourceCatalog {
    master: MasterIndex,
    root: PathBuf,
}

impl ResourceCatalog {
    /// Load the snapshot from `index_dir`, resolving resource paths
    /// against `root`.
    ///
    /// # Errors
    /// [`SearchError::IndexMissing`] when no build has run yet.
    pub fn load(index_dir: &Path, root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            master: loader::load_master(index_dir)?,
            root: root.into(),
        })
    }

    /// Wrap an already-loaded snapshot (fixture-friendly constructor)
    pub fn from_master(master: MasterIndex, root: impl Into<PathBuf>) -> Self {
        Self {
            master,
            root: root.into(),
        }
    }

    /// All entries, optionally restricted to one kind
    pub fn list(&self, kind: Option<ResourceKind>) -> Vec<&Resource> {
        match kind {
            Some(kind) => self.master.resources.by_kind(kind).iter().collect(),
            None => self.master.resources.iter().collect(),
        }
    }

    /// Ranked substring search over names and descriptions.
    ///
    /// Filters by kind, then tags (any-match), then case-insensitive
    /// containment of `query` in name or description; ranks exact name
    /// matches before name-contains before description-only matches,
    /// lexicographically by name within a tier; truncates to
    /// `opts.limit`. An empty query matches every entry.
    pub fn search(&self, query: &str, opts: &SearchOptions) -> Vec<&Resource> {
        let query = query.to_lowercase();

        let mut matches: Vec<(MatchTier, &Resource)> = self
            .list(opts.kind)
            .into_iter()
            .filter(|r| opts.tags.is_empty() || r.has_any_tag(&opts.tags))
            .filter_map(|r| match_tier(r, &query).map(|tier| (tier, r)))
            .collect();

        matches.sort_by(|(a_tier, a), (b_tier, b)| {
            a_tier
                .cmp(b_tier)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });

        debug!("Search '{}' matched {} resource(s)", query, matches.len());

        matches
            .into_iter()
            .take(opts.limit)
            .map(|(_, r)| r)
            .collect()
    }

    /// Look up a single resource by name and attach its body.
    ///
    /// Exact name matches win; if there are none, the lookup retries
    /// case-insensitively. `kind` disambiguates names shared across
    /// kinds.
    ///
    /// # Errors
    /// [`SearchError::NotFound`] when nothing matches,
    /// [`SearchError::AmbiguousName`] when several kinds share the
    /// name and no kind was given, [`SearchError::ResourceUnavailable`]
    /// when the backing file is gone.
    pub fn get_by_name(&self, name: &str, kind: Option<ResourceKind>) -> Result<LoadedResource> {
        let pool = self.list(kind);

        let mut candidates: Vec<&Resource> =
            pool.iter().copied().filter(|r| r.name == name).collect();
        if candidates.is_empty() {
            let lower = name.to_lowercase();
            candidates = pool
                .iter()
                .copied()
                .filter(|r| r.name.to_lowercase() == lower)
                .collect();
        }

        let resource = match candidates.as_slice() {
            [] => {
                return Err(SearchError::NotFound {
                    name: name.to_string(),
                })
            }
            [single] => *single,
            many => {
                return Err(SearchError::AmbiguousName {
                    name: name.to_string(),
                    kinds: many.iter().map(|r| r.kind()).collect(),
                })
            }
        };

        let content = self.read_content(resource)?;
        Ok(LoadedResource {
            resource: resource.clone(),
            content,
        })
    }

    /// The persisted aggregate counters plus `generatedAt`
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            stats: self.master.stats,
            generated_at: self.master.generated_at,
        }
    }

    /// Read a resource's full body from its backing document.
    ///
    /// # Errors
    /// [`SearchError::ResourceUnavailable`] if the file was deleted
    /// since the last build.
    pub fn read_content(&self, resource: &Resource) -> Result<String> {
        let path = self.root.join(&resource.path);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SearchError::ResourceUnavailable { path })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Tier of a match, or `None` when the entry does not match at all.
/// Every name contains the empty query, so an empty query lands all
/// entries in the name-contains tier.
fn match_tier(resource: &Resource, query_lower: &str) -> Option<MatchTier> {
    let name = resource.name.to_lowercase();
    if name == *query_lower {
        return Some(MatchTier::ExactName);
    }
    if name.contains(query_lower) {
        return Some(MatchTier::NameContains);
    }
    if resource.description.to_lowercase().contains(query_lower) {
        return Some(MatchTier::DescriptionOnly);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use loredex_types::{KindFields, ResourceSet};

    fn named(name: &str, description: &str) -> Resource {
        Resource {
            name: name.into(),
            description: description.into(),
            path: format!("reference/prompts/{name}.prompt.md"),
            size: 1,
            fields: KindFields::Prompt { tags: Vec::new() },
        }
    }

    fn catalog(prompts: Vec<Resource>) -> ResourceCatalog {
        let master = MasterIndex::new(
            ResourceSet {
                prompts,
                ..Default::default()
            },
            Utc::now(),
        );
        ResourceCatalog::from_master(master, ".")
    }

    #[test]
    fn test_rank_exact_then_name_then_description() {
        let catalog = catalog(vec![
            named("Budget", "watches alarm spend"),
            named("Alarm Governance", "rules"),
            named("alarm", "the base skill"),
        ]);
        let hits = catalog.search("alarm", &SearchOptions::default());
        let names: Vec<_> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["alarm", "Alarm Governance", "Budget"]);
    }

    #[test]
    fn test_empty_query_matches_all_lexicographically() {
        let catalog = catalog(vec![
            named("zeta", ""),
            named("Alpha", ""),
            named("mid", ""),
        ]);
        let hits = catalog.search("", &SearchOptions::default());
        let names: Vec<_> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_limit_truncates_after_ranking() {
        let catalog = catalog(vec![
            named("beta", ""),
            named("alpha", ""),
            named("gamma", ""),
        ]);
        let hits = catalog.search(
            "",
            &SearchOptions {
                limit: 2,
                ..Default::default()
            },
        );
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "alpha");
    }

    #[test]
    fn test_no_match_excluded() {
        let catalog = catalog(vec![named("alpha", "first letter")]);
        assert!(catalog.search("omega", &SearchOptions::default()).is_empty());
    }
}
