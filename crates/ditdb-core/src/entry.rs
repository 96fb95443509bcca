//! Module: entry
//! Responsibility: the in-memory entry model and modification descriptors.
//! Does not own: schema classification or index maintenance.

use crate::name::{Dn, normalize};

///
/// Attribute
///
/// One attribute on an entry: a normalized type identifier plus an ordered,
/// duplicate-free value list. Values are kept verbatim; equality between
/// values goes through normalization so `CN=Foo` and `cn=foo` collide.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    id: String,
    values: Vec<String>,
}

impl Attribute {
    #[must_use]
    pub fn new(attr_type: &str) -> Self {
        Self {
            id: normalize(attr_type),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_values<I, S>(attr_type: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut attr = Self::new(attr_type);
        for value in values {
            attr.add(&value.into());
        }

        attr
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        let needle = normalize(value);
        self.values.iter().any(|v| normalize(v) == needle)
    }

    /// Add one value; returns false (and keeps the stored form) when an
    /// equal value is already present.
    pub fn add(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        self.values.push(value.to_string());

        true
    }

    /// Remove one value by normalized equality; returns whether it was held.
    pub fn remove(&mut self, value: &str) -> bool {
        let needle = normalize(value);
        let before = self.values.len();
        self.values.retain(|v| normalize(v) != needle);

        before != self.values.len()
    }
}

///
/// ModOp
///
/// The three modification kinds of a directory modify operation.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModOp {
    Add,
    Remove,
    Replace,
}

///
/// Modification
///
/// One modify step: an operation applied to one attribute. A `Remove` with an
/// empty value list removes the attribute outright.
///

#[derive(Clone, Debug)]
pub struct Modification {
    pub op: ModOp,
    pub attribute: Attribute,
}

impl Modification {
    #[must_use]
    pub const fn new(op: ModOp, attribute: Attribute) -> Self {
        Self { op, attribute }
    }
}

///
/// Entry
///
/// A directory entry: its current DN plus an insertion-ordered attribute
/// collection. Owned exclusively by the master table once added; every other
/// structure refers to it by id only.
///

#[derive(Clone, Debug)]
pub struct Entry {
    dn: Dn,
    attributes: Vec<Attribute>,
}

impl Entry {
    #[must_use]
    pub const fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: Vec::new(),
        }
    }

    /// Builder-style convenience used heavily by tests and callers.
    #[must_use]
    pub fn with<I, S>(mut self, attr_type: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.put(attr_type, values);
        self
    }

    #[must_use]
    pub const fn dn(&self) -> &Dn {
        &self.dn
    }

    pub fn set_dn(&mut self, dn: Dn) {
        self.dn = dn;
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn get(&self, attr_type: &str) -> Option<&Attribute> {
        let id = normalize(attr_type);
        self.attributes.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn has(&self, attr_type: &str) -> bool {
        self.get(attr_type).is_some()
    }

    #[must_use]
    pub fn has_value(&self, attr_type: &str, value: &str) -> bool {
        self.get(attr_type).is_some_and(|a| a.contains(value))
    }

    #[must_use]
    pub fn first(&self, attr_type: &str) -> Option<&str> {
        self.get(attr_type).and_then(Attribute::first)
    }

    /// Add values to an attribute, creating it if absent. Duplicate values
    /// are dropped by the idempotence rule.
    pub fn put<I, S>(&mut self, attr_type: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = normalize(attr_type);
        let pos = match self.attributes.iter().position(|a| a.id == id) {
            Some(pos) => pos,
            None => {
                self.attributes.push(Attribute::new(attr_type));
                self.attributes.len() - 1
            }
        };

        for value in values {
            self.attributes[pos].add(&value.into());
        }
    }

    pub fn add_value(&mut self, attr_type: &str, value: &str) -> bool {
        let id = normalize(attr_type);
        match self.attributes.iter_mut().find(|a| a.id == id) {
            Some(attr) => attr.add(value),
            None => {
                self.attributes
                    .push(Attribute::with_values(attr_type, [value]));
                true
            }
        }
    }

    /// Remove one value; the attribute goes with its last value.
    pub fn remove_value(&mut self, attr_type: &str, value: &str) -> bool {
        let id = normalize(attr_type);
        let Some(pos) = self.attributes.iter().position(|a| a.id == id) else {
            return false;
        };

        let removed = self.attributes[pos].remove(value);
        if self.attributes[pos].is_empty() {
            self.attributes.remove(pos);
        }

        removed
    }

    pub fn remove_attribute(&mut self, attr_type: &str) -> Option<Attribute> {
        let id = normalize(attr_type);
        let pos = self.attributes.iter().position(|a| a.id == id)?;

        Some(self.attributes.remove(pos))
    }

    /// Replace the attribute's value set wholesale; an empty set removes it.
    pub fn replace(&mut self, attribute: Attribute) -> Option<Attribute> {
        let previous = self.remove_attribute(&attribute.id);
        if !attribute.is_empty() {
            self.attributes.push(attribute);
        }

        previous
    }
}
