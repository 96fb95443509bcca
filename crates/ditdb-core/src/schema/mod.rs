//! Module: schema
//! Responsibility: the attribute-type lookup surface the store consumes.
//! Does not own: entry storage or index maintenance.
//!
//! The store never interprets schema beyond three questions: what OID does a
//! name resolve to, does the type have an EQUALITY matching rule (and can
//! therefore be indexed), and what descriptor backs an OID.

use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use crate::name::normalize;

///
/// Oid
///
/// Dotted-decimal object identifier of an attribute type.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Oid(String);

impl Oid {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// well_known
///
/// Operational attribute types the store special-cases. OIDs are the
/// standard ones so dumps line up with real directory data.
///

pub mod well_known {
    use super::Oid;

    pub const OBJECT_CLASS: &str = "2.5.4.0";
    pub const ALIAS_TARGET: &str = "2.5.4.1";
    pub const ENTRY_CSN: &str = "1.3.6.1.4.1.4203.666.1.7";
    pub const ENTRY_UUID: &str = "1.3.6.1.1.16.4";

    /// Object-class value marking an entry as an alias.
    pub const ALIAS_OBJECT_CLASS_VALUE: &str = "alias";

    #[must_use]
    pub fn object_class() -> Oid {
        Oid::new(OBJECT_CLASS)
    }

    #[must_use]
    pub fn alias_target() -> Oid {
        Oid::new(ALIAS_TARGET)
    }

    #[must_use]
    pub fn entry_csn() -> Oid {
        Oid::new(ENTRY_CSN)
    }

    #[must_use]
    pub fn entry_uuid() -> Oid {
        Oid::new(ENTRY_UUID)
    }
}

///
/// AttributeType
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AttributeType {
    oid: Oid,
    names: Vec<String>,
    has_equality: bool,
}

impl AttributeType {
    #[must_use]
    pub fn new<I, S>(oid: &str, names: I, has_equality: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            oid: Oid::new(oid),
            names: names.into_iter().map(Into::into).collect(),
            has_equality,
        }
    }

    #[must_use]
    pub const fn oid(&self) -> &Oid {
        &self.oid
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub const fn has_equality(&self) -> bool {
        self.has_equality
    }
}

///
/// SchemaView
///
/// The external schema subsystem, seen from the store. Implementations
/// resolve attribute names case-insensitively and accept a raw OID string
/// wherever a name is accepted.
///

pub trait SchemaView {
    fn attribute_oid(&self, name: &str) -> Option<Oid>;
    fn has_equality(&self, oid: &Oid) -> bool;
    fn lookup_type(&self, oid: &Oid) -> Option<&AttributeType>;
}

///
/// SchemaRegistry
///
/// A concrete schema service: enough for the partition façade and for tests.
/// `standard()` pre-registers the operational types every entry carries.
///

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    by_oid: BTreeMap<Oid, AttributeType>,
    by_name: BTreeMap<String, Oid>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the operational attribute types plus the common
    /// naming attributes used across the test corpus.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_attribute(well_known::OBJECT_CLASS, ["objectClass"], true)
            .with_attribute(well_known::ALIAS_TARGET, ["aliasedObjectName"], true)
            .with_attribute(well_known::ENTRY_CSN, ["entryCSN"], true)
            .with_attribute(well_known::ENTRY_UUID, ["entryUUID"], true)
            .with_attribute("2.5.4.3", ["cn", "commonName"], true)
            .with_attribute("2.5.4.10", ["o", "organizationName"], true)
            .with_attribute("2.5.4.11", ["ou", "organizationalUnitName"], true)
    }

    #[must_use]
    pub fn with_attribute<I, S>(mut self, oid: &str, names: I, has_equality: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(AttributeType::new(oid, names, has_equality));
        self
    }

    pub fn register(&mut self, attr_type: AttributeType) {
        for name in attr_type.names() {
            self.by_name
                .insert(normalize(name), attr_type.oid().clone());
        }
        self.by_oid.insert(attr_type.oid().clone(), attr_type);
    }
}

impl SchemaView for SchemaRegistry {
    fn attribute_oid(&self, name: &str) -> Option<Oid> {
        let key = normalize(name);
        if let Some(oid) = self.by_name.get(&key) {
            return Some(oid.clone());
        }

        // Raw OID strings are accepted wherever a name is.
        let as_oid = Oid::new(name);
        self.by_oid.contains_key(&as_oid).then_some(as_oid)
    }

    fn has_equality(&self, oid: &Oid) -> bool {
        self.by_oid
            .get(oid)
            .is_some_and(AttributeType::has_equality)
    }

    fn lookup_type(&self, oid: &Oid) -> Option<&AttributeType> {
        self.by_oid.get(oid)
    }
}
