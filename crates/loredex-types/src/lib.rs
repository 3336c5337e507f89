//! Loredex Types - Core types for the loredex resource index
//!
//! This module defines the resource records produced by the scanners and
//! the persisted index shapes shared by the builder, the search engine
//! and the tool server.

pub mod index;
pub mod resource;

pub use index::{IndexStats, MasterIndex, ResourceSet, MASTER_INDEX_FILE};
pub use resource::{KindFields, KindParseError, Resource, ResourceKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{IndexStats, KindFields, MasterIndex, Resource, ResourceKind};
}
