//! Suffix-rooted, fully indexed in-memory directory partitions.
//!
//! ## Crate layout
//! - `core`: entry model, DN machinery, the store engine, and its indices.
//! - `partition`: lifecycle wrapper that provisions a store from
//!   configuration and stamps operational attributes on write.
//!
//! The `prelude` module mirrors the surface a directory frontend uses.

pub use ditdb_core as core;

pub mod partition;

pub use partition::{Partition, PartitionConfig, PartitionError};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Partition, PartitionConfig, PartitionError,
        core::{
            entry::{Attribute, Entry, ModOp, Modification},
            id::EntryId,
            name::{Dn, Rdn},
            schema::{Oid, SchemaRegistry, SchemaView},
        },
    };
}
