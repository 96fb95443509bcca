//! Module: store
//! Responsibility: the entry store plus the coordinated system/user index
//! set, and every invariant-preserving mutation algorithm.
//! Does not own: schema contents, access control, or query planning.
//!
//! Invariants (after every successful mutation):
//! - Normalized-DN and user-DN indices are a bijection over live ids.
//! - One-level holds (parent, child) iff child's immediate parent matches.
//! - Sub-level is the reflexive transitive closure of one-level, excluding
//!   the suffix entry itself.
//! - Presence holds (oid, id) iff the entry carries the indexed attribute.
//! - Alias tuples obey the constraints in the alias module.
//!
//! A mutation that returns an error after its validation phase may leave the
//! indices in an undefined state; callers treat the store as poisoned for
//! that operation. There is no rollback machinery.

mod add;
mod alias;
mod builder;
mod cascade;
mod delete;
mod hierarchy;
mod modify;

pub use builder::{StoreBuilder, UserIndexConfig};

use std::collections::BTreeMap;
use thiserror::Error as ThisError;

use crate::{
    entry::Entry,
    id::EntryId,
    index::Index,
    master::MasterTable,
    name::{Dn, DnParseError},
    schema::{Oid, SchemaView, well_known},
};

/// Normalized attribute identifiers the store special-cases.
pub const AT_OBJECT_CLASS: &str = "objectclass";
pub const AT_ALIAS_TARGET: &str = "aliasedobjectname";
pub const AT_ENTRY_CSN: &str = "entrycsn";
pub const AT_ENTRY_UUID: &str = "entryuuid";

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("no such object: cannot resolve '{dn}'")]
    NoSuchObject { dn: String },

    #[error("no entry with id {id}")]
    NoSuchEntry { id: EntryId },

    #[error("entry already exists: '{dn}'")]
    EntryAlreadyExists { dn: String },

    #[error("schema violation: entry '{dn}' has no object class")]
    MissingObjectClass { dn: String },

    #[error("schema violation: entry '{dn}' is missing required attribute '{attr}'")]
    MissingRequiredAttribute { dn: String, attr: &'static str },

    #[error("alias cycle: target '{target}' is '{alias}' or one of its ancestors")]
    AliasCycle { alias: String, target: String },

    #[error("alias chain: target '{target}' of alias '{alias}' is itself an alias")]
    AliasChain { alias: String, target: String },

    #[error("dangling alias: target '{target}' of alias '{alias}' does not exist")]
    AliasDangling { alias: String, target: String },

    #[error("alias target '{target}' lies outside suffix '{suffix}'")]
    AliasOutOfScope { target: String, suffix: String },

    #[error("no index bound for attribute {oid}")]
    IndexNotFound { oid: Oid },

    #[error("entry {id} still has children; delete leaves first")]
    NotAllowedOnNonLeaf { id: EntryId },

    #[error("the suffix entry cannot be moved or renamed away")]
    NotAllowedOnSuffix,

    #[error("cannot move '{dn}' under its own subtree at '{new_parent}'")]
    MoveIntoOwnSubtree { dn: String, new_parent: String },

    #[error(transparent)]
    InvalidDn(#[from] DnParseError),
}

///
/// SystemIndices
///
/// The fixed index set every store carries. Hierarchy-shaped members use a
/// fanning-out reverse side; the rest are single-valued in reverse.
///

#[derive(Debug)]
pub(crate) struct SystemIndices {
    /// normalized DN -> id
    pub(crate) ndn: Index<String>,
    /// user-provided DN -> id
    pub(crate) updn: Index<String>,
    /// attribute OID -> ids carrying at least one value of it
    pub(crate) presence: Index<Oid>,
    /// normalized alias-target DN -> alias id
    pub(crate) alias: Index<String>,
    /// parent id -> child id
    pub(crate) one_level: Index<EntryId>,
    /// ancestor id -> descendant id (reflexive transitive closure)
    pub(crate) sub_level: Index<EntryId>,
    /// alias-parent id -> target id (one-level alias scope)
    pub(crate) one_alias: Index<EntryId>,
    /// ancestor id -> target id (subtree alias scope)
    pub(crate) sub_alias: Index<EntryId>,
    /// normalized object-class value -> id
    pub(crate) object_class: Index<String>,
    /// entryCSN value -> id
    pub(crate) entry_csn: Index<String>,
    /// entryUUID value -> id
    pub(crate) entry_uuid: Index<String>,
}

/// OIDs for the structural system indices, which index no real attribute.
/// Kept under one private arc so dumps read consistently.
pub(crate) mod sysoid {
    pub(crate) const NDN: &str = "1.3.6.1.4.1.56521.2.1";
    pub(crate) const UPDN: &str = "1.3.6.1.4.1.56521.2.2";
    pub(crate) const PRESENCE: &str = "1.3.6.1.4.1.56521.2.3";
    pub(crate) const ONE_LEVEL: &str = "1.3.6.1.4.1.56521.2.4";
    pub(crate) const SUB_LEVEL: &str = "1.3.6.1.4.1.56521.2.5";
    pub(crate) const ONE_ALIAS: &str = "1.3.6.1.4.1.56521.2.6";
    pub(crate) const SUB_ALIAS: &str = "1.3.6.1.4.1.56521.2.7";
}

impl SystemIndices {
    pub(crate) fn new() -> Self {
        Self {
            ndn: Index::new(Oid::new(sysoid::NDN)),
            updn: Index::new(Oid::new(sysoid::UPDN)),
            presence: Index::new(Oid::new(sysoid::PRESENCE)),
            alias: Index::new(well_known::alias_target()),
            one_level: Index::hierarchical(Oid::new(sysoid::ONE_LEVEL)),
            sub_level: Index::hierarchical(Oid::new(sysoid::SUB_LEVEL)),
            one_alias: Index::hierarchical(Oid::new(sysoid::ONE_ALIAS)),
            sub_alias: Index::hierarchical(Oid::new(sysoid::SUB_ALIAS)),
            object_class: Index::new(well_known::object_class()),
            entry_csn: Index::new(well_known::entry_csn()),
            entry_uuid: Index::new(well_known::entry_uuid()),
        }
    }
}

///
/// Store
///
/// The store for one naming context. Construction goes through
/// [`StoreBuilder`], so the index set is fixed by the time any operation can
/// run; there is no post-initialization reconfiguration surface to guard.
///
/// Single-writer: nothing here locks. The caller serializes mutations.
///

#[derive(Debug)]
pub struct Store<S: SchemaView> {
    pub(crate) schema: S,
    pub(crate) suffix: Dn,
    pub(crate) master: MasterTable,
    pub(crate) sys: SystemIndices,
    pub(crate) user: BTreeMap<Oid, Index<String>>,
}

impl<S: SchemaView> Store<S> {
    // ----- naming -----

    #[must_use]
    pub const fn suffix(&self) -> &Dn {
        &self.suffix
    }

    #[must_use]
    pub const fn schema(&self) -> &S {
        &self.schema
    }

    /// Resolve a DN to its id.
    #[must_use]
    pub fn entry_id(&self, dn: &Dn) -> Option<EntryId> {
        self.sys.ndn.forward_lookup(&dn.normalized().to_string())
    }

    /// The normalized DN of an id.
    #[must_use]
    pub fn entry_dn(&self, id: EntryId) -> Option<&str> {
        self.sys.ndn.reverse_lookup(id).map(String::as_str)
    }

    /// The user-provided DN of an id.
    #[must_use]
    pub fn entry_updn(&self, id: EntryId) -> Option<&str> {
        self.sys.updn.reverse_lookup(id).map(String::as_str)
    }

    /// The immediate parent id; `None` for the suffix entry (whose parent is
    /// the virtual root) and for unknown ids.
    #[must_use]
    pub fn parent_id(&self, id: EntryId) -> Option<EntryId> {
        self.sys.one_level.reverse_lookup(id).copied()
    }

    // ----- entry reads -----

    #[must_use]
    pub fn lookup(&self, id: EntryId) -> Option<&Entry> {
        self.master.get(id)
    }

    /// Ids of the immediate children of an entry, in ascending id order
    /// (which is insertion order, since ids are never reused).
    pub fn list(&self, id: EntryId) -> impl Iterator<Item = EntryId> + '_ {
        self.sys.one_level.forward_values(&id)
    }

    #[must_use]
    pub fn child_count(&self, id: EntryId) -> usize {
        self.sys.one_level.count_for_key(&id)
    }

    /// Number of live entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.master.count()
    }

    // ----- index access (search-engine surface) -----

    #[must_use]
    pub fn has_user_index(&self, oid: &Oid) -> bool {
        self.user.contains_key(oid)
    }

    pub fn user_index(&self, oid: &Oid) -> Result<&Index<String>, StoreError> {
        self.user.get(oid).ok_or_else(|| StoreError::IndexNotFound {
            oid: oid.clone(),
        })
    }

    /// The user index for an attribute name or raw OID, resolved through
    /// schema.
    pub fn user_index_by_name(&self, name: &str) -> Result<&Index<String>, StoreError> {
        let oid = self
            .schema
            .attribute_oid(name)
            .ok_or_else(|| StoreError::IndexNotFound {
                oid: Oid::new(name),
            })?;

        self.user_index(&oid)
    }

    /// User index OIDs, for introspection.
    pub fn user_index_oids(&self) -> impl Iterator<Item = &Oid> {
        self.user.keys()
    }

    #[must_use]
    pub const fn ndn_index(&self) -> &Index<String> {
        &self.sys.ndn
    }

    #[must_use]
    pub const fn updn_index(&self) -> &Index<String> {
        &self.sys.updn
    }

    #[must_use]
    pub const fn presence_index(&self) -> &Index<Oid> {
        &self.sys.presence
    }

    #[must_use]
    pub const fn alias_index(&self) -> &Index<String> {
        &self.sys.alias
    }

    #[must_use]
    pub const fn one_level_index(&self) -> &Index<EntryId> {
        &self.sys.one_level
    }

    #[must_use]
    pub const fn sub_level_index(&self) -> &Index<EntryId> {
        &self.sys.sub_level
    }

    #[must_use]
    pub const fn one_alias_index(&self) -> &Index<EntryId> {
        &self.sys.one_alias
    }

    #[must_use]
    pub const fn sub_alias_index(&self) -> &Index<EntryId> {
        &self.sys.sub_alias
    }

    #[must_use]
    pub const fn object_class_index(&self) -> &Index<String> {
        &self.sys.object_class
    }

    #[must_use]
    pub const fn entry_csn_index(&self) -> &Index<String> {
        &self.sys.entry_csn
    }

    #[must_use]
    pub const fn entry_uuid_index(&self) -> &Index<String> {
        &self.sys.entry_uuid
    }

    // ----- shared internals -----

    /// Resolve or fail with no-such-object.
    pub(crate) fn require_id(&self, dn: &Dn) -> Result<EntryId, StoreError> {
        self.entry_id(dn).ok_or_else(|| StoreError::NoSuchObject {
            dn: dn.user().to_string(),
        })
    }

    /// The user index for an entry attribute, resolved through schema.
    pub(crate) fn user_index_for_attr(&mut self, attr_id: &str) -> Option<(Oid, &mut Index<String>)> {
        let oid = self.schema.attribute_oid(attr_id)?;
        let index = self.user.get_mut(&oid)?;

        Some((oid, index))
    }
}
