//! Error types for catalog operations

use loredex_types::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;

/// Catalog and lookup errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// No index has been built yet
    #[error("Index not found at {path:?}. Run a build first.")]
    IndexMissing {
        /// Artifact path that was probed
        path: PathBuf,
    },

    /// No resource matched a lookup
    #[error("Resource not found: {name}")]
    NotFound {
        /// The requested name
        name: String,
    },

    /// A bare-name lookup matched resources of several kinds
    #[error("Resource name '{name}' is ambiguous across kinds {kinds:?}; pass a kind to disambiguate")]
    AmbiguousName {
        /// The requested name
        name: String,
        /// Kinds that carry a resource with this name
        kinds: Vec<ResourceKind>,
    },

    /// An index entry's backing file no longer exists
    #[error("Resource file no longer exists: {path:?}. Rebuild the index.")]
    ResourceUnavailable {
        /// The dangling document path
        path: PathBuf,
    },

    /// Index artifact could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, SearchError>;
