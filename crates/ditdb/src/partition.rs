//! Module: Partition
//! Responsibility: lifecycle and operational-attribute stamping around one
//! suffix-rooted entry store.
//! Does not own: store algorithms or index maintenance (ditdb-core).

use thiserror::Error as ThisError;
use tracing::info;
use ulid::Ulid;

use ditdb_core::{
    csn::CsnFactory,
    entry::{Entry, Modification},
    id::EntryId,
    name::{Dn, DnParseError, Rdn},
    schema::SchemaView,
    store::{AT_ENTRY_CSN, AT_ENTRY_UUID, Store, StoreBuilder, StoreError, UserIndexConfig},
};

///
/// PartitionError
///

#[derive(Debug, ThisError)]
pub enum PartitionError {
    #[error("state violation: {reason}")]
    StateViolation { reason: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidDn(#[from] DnParseError),
}

///
/// PartitionConfig
///
/// Declarative shape of a partition: the suffix it roots and the attributes
/// to index. Held from construction; consumed when the store is built.
///

#[derive(Clone, Debug)]
pub struct PartitionConfig {
    pub suffix: String,
    pub index_attributes: Vec<String>,
}

impl PartitionConfig {
    #[must_use]
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            index_attributes: Vec::new(),
        }
    }

    /// Request a user index on an attribute name or raw OID.
    #[must_use]
    pub fn index_attribute(mut self, attribute: &str) -> Self {
        self.index_attributes.push(attribute.to_string());
        self
    }
}

///
/// Partition
///
/// One suffix-rooted partition of the directory tree. Construction takes the
/// configuration only; `initialize` supplies the schema and builds the store.
/// Every operation before that point is a state violation, as is swapping the
/// configuration afterwards.
///

pub struct Partition<S: SchemaView> {
    config: PartitionConfig,
    store: Option<Store<S>>,
    csn: CsnFactory,
}

impl<S: SchemaView> Partition<S> {
    #[must_use]
    pub const fn new(config: PartitionConfig) -> Self {
        Self {
            config,
            store: None,
            csn: CsnFactory::new(1),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &PartitionConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.store.is_some()
    }

    /// Build the store under the configured suffix. Index provisioning and
    /// its skip rules live in the store builder.
    pub fn initialize(&mut self, schema: S) -> Result<(), PartitionError> {
        if self.is_initialized() {
            return Err(PartitionError::StateViolation {
                reason: "partition is already initialized",
            });
        }

        let suffix = Dn::parse(&self.config.suffix)?;
        let configs = self
            .config
            .index_attributes
            .iter()
            .map(|attribute| UserIndexConfig::new(attribute));

        self.store = Some(
            StoreBuilder::new(schema, suffix)
                .index_configs(configs)
                .build(),
        );
        info!(suffix = %self.config.suffix, "partition initialized");

        Ok(())
    }

    /// Replace the configuration. Only legal before `initialize`.
    pub fn set_config(&mut self, config: PartitionConfig) -> Result<(), PartitionError> {
        if self.is_initialized() {
            return Err(PartitionError::StateViolation {
                reason: "cannot reconfigure an initialized partition",
            });
        }
        self.config = config;

        Ok(())
    }

    /// Tear the store down. The partition returns to its pre-initialize
    /// state and can be initialized again.
    pub fn destroy(&mut self) {
        if self.store.take().is_some() {
            info!(suffix = %self.config.suffix, "partition destroyed");
        }
    }

    fn store(&self) -> Result<&Store<S>, PartitionError> {
        self.store.as_ref().ok_or(PartitionError::StateViolation {
            reason: "partition is not initialized",
        })
    }

    fn store_mut(&mut self) -> Result<&mut Store<S>, PartitionError> {
        self.store.as_mut().ok_or(PartitionError::StateViolation {
            reason: "partition is not initialized",
        })
    }

    // ----- mutations -----

    /// Add an entry, stamping `entryCSN` and `entryUUID` when the caller did
    /// not supply them.
    pub fn add(&mut self, mut entry: Entry) -> Result<EntryId, PartitionError> {
        if !entry.has(AT_ENTRY_CSN) {
            let csn = self.csn.next();
            entry.put(AT_ENTRY_CSN, [csn.to_string()]);
        }
        if !entry.has(AT_ENTRY_UUID) {
            entry.put(AT_ENTRY_UUID, [new_entry_uuid()]);
        }

        Ok(self.store_mut()?.add(entry)?)
    }

    pub fn delete(&mut self, id: EntryId) -> Result<Entry, PartitionError> {
        Ok(self.store_mut()?.delete(id)?)
    }

    pub fn modify(
        &mut self,
        dn: &Dn,
        modification: &Modification,
    ) -> Result<(), PartitionError> {
        Ok(self.store_mut()?.modify(dn, modification)?)
    }

    pub fn rename(
        &mut self,
        dn: &Dn,
        new_rdn: &Rdn,
        delete_old_rdn: bool,
    ) -> Result<(), PartitionError> {
        Ok(self.store_mut()?.rename(dn, new_rdn, delete_old_rdn)?)
    }

    pub fn move_entry(&mut self, old_dn: &Dn, new_parent_dn: &Dn) -> Result<(), PartitionError> {
        Ok(self.store_mut()?.move_entry(old_dn, new_parent_dn)?)
    }

    pub fn move_and_rename(
        &mut self,
        old_dn: &Dn,
        new_parent_dn: &Dn,
        new_rdn: &Rdn,
        delete_old_rdn: bool,
    ) -> Result<(), PartitionError> {
        Ok(self
            .store_mut()?
            .move_and_rename(old_dn, new_parent_dn, new_rdn, delete_old_rdn)?)
    }

    // ----- reads -----

    pub fn lookup(&self, id: EntryId) -> Result<Option<&Entry>, PartitionError> {
        Ok(self.store()?.lookup(id))
    }

    pub fn entry_id(&self, dn: &Dn) -> Result<Option<EntryId>, PartitionError> {
        Ok(self.store()?.entry_id(dn))
    }

    pub fn entry_dn(&self, id: EntryId) -> Result<Option<&str>, PartitionError> {
        Ok(self.store()?.entry_dn(id))
    }

    pub fn entry_updn(&self, id: EntryId) -> Result<Option<&str>, PartitionError> {
        Ok(self.store()?.entry_updn(id))
    }

    pub fn parent_id(&self, id: EntryId) -> Result<Option<EntryId>, PartitionError> {
        Ok(self.store()?.parent_id(id))
    }

    pub fn children(&self, id: EntryId) -> Result<Vec<EntryId>, PartitionError> {
        Ok(self.store()?.list(id).collect())
    }

    pub fn child_count(&self, id: EntryId) -> Result<usize, PartitionError> {
        Ok(self.store()?.child_count(id))
    }

    pub fn count(&self) -> Result<usize, PartitionError> {
        Ok(self.store()?.count())
    }

    /// Direct store access for callers that need the index surfaces.
    pub fn raw(&self) -> Result<&Store<S>, PartitionError> {
        self.store()
    }
}

/// A fresh `entryUUID` value in the standard 8-4-4-4-12 form, derived from a
/// ULID's 128 bits.
fn new_entry_uuid() -> String {
    let bits: u128 = Ulid::new().into();
    let hex = format!("{bits:032x}");

    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
