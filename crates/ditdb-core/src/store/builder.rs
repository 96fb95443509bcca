//! Store construction. All index bindings are supplied up front; the built
//! store's index set is immutable in kind, so "initialized" is a property of
//! the type, not a runtime state flag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{
    index::Index,
    master::MasterTable,
    name::Dn,
    schema::{SchemaView, well_known},
    store::{Store, SystemIndices},
};

///
/// UserIndexConfig
///
/// One requested user index, by attribute name or raw OID. Provisioning
/// resolves and classifies it against schema; requests that cannot be
/// honored are skipped, never fatal.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct UserIndexConfig {
    pub attribute: String,
}

impl UserIndexConfig {
    #[must_use]
    pub fn new(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
        }
    }
}

///
/// StoreBuilder
///

pub struct StoreBuilder<S: SchemaView> {
    schema: S,
    suffix: Dn,
    requested: Vec<UserIndexConfig>,
}

impl<S: SchemaView> StoreBuilder<S> {
    #[must_use]
    pub const fn new(schema: S, suffix: Dn) -> Self {
        Self {
            schema,
            suffix,
            requested: Vec::new(),
        }
    }

    /// Request a user index on an attribute.
    #[must_use]
    pub fn index_attribute(mut self, attribute: &str) -> Self {
        self.requested.push(UserIndexConfig::new(attribute));
        self
    }

    #[must_use]
    pub fn index_configs(mut self, configs: impl IntoIterator<Item = UserIndexConfig>) -> Self {
        self.requested.extend(configs);
        self
    }

    /// Materialize the store: system indices always, user indices for every
    /// resolvable attribute with an EQUALITY matching rule.
    #[must_use]
    pub fn build(self) -> Store<S> {
        let mut user = BTreeMap::new();

        for config in &self.requested {
            let Some(oid) = self.schema.attribute_oid(&config.attribute) else {
                warn!(attribute = %config.attribute, "skipping index on unknown attribute");
                continue;
            };

            if is_system_indexed(oid.as_str()) {
                debug!(attribute = %config.attribute, %oid, "attribute is system-indexed, ignoring");
                continue;
            }

            if !self.schema.has_equality(&oid) {
                warn!(
                    attribute = %config.attribute,
                    %oid,
                    "attribute has no EQUALITY matching rule, skipping index"
                );
                continue;
            }

            user.entry(oid.clone()).or_insert_with(|| Index::new(oid));
        }

        Store {
            schema: self.schema,
            suffix: self.suffix,
            master: MasterTable::new(),
            sys: SystemIndices::new(),
            user,
        }
    }
}

/// Attributes whose indexing is covered by a mandatory system index.
fn is_system_indexed(oid: &str) -> bool {
    matches!(
        oid,
        well_known::OBJECT_CLASS
            | well_known::ALIAS_TARGET
            | well_known::ENTRY_CSN
            | well_known::ENTRY_UUID
    )
}
