//! Core engine for ditdb: the in-memory entry store for one naming context
//! of a directory information tree, with the system and user indices that
//! keep name resolution, hierarchy enumeration, alias dereferencing, and
//! attribute search consistent across every structural mutation.
#![warn(unreachable_pub)]

pub mod csn;
pub mod entry;
pub mod error;
pub mod id;
pub mod index;
pub mod master;
pub mod name;
pub mod schema;
pub mod store;
pub mod tree;

pub use error::Error;

///
/// Prelude
///
/// Domain vocabulary only; no errors, builders, or internals.
///

pub mod prelude {
    pub use crate::{
        entry::{Attribute, Entry, ModOp, Modification},
        id::EntryId,
        name::{Dn, Rdn},
        schema::{Oid, SchemaView},
    };
}
