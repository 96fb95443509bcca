//! Module: name
//! Responsibility: distinguished-name model, parsing, and normalization.
//! Does not own: schema resolution of attribute types or id lookup.
//!
//! Invariants:
//! - A `Dn` always carries both forms (user-provided and normalized) and the
//!   two agree on component count by construction.
//! - Components are held root-first; the leaf RDN is the last component.
//! - Normalization is canonical: lowercased attribute type, trimmed and
//!   lowercased value, multi-valued RDN components in sorted type order.

#[cfg(test)]
mod tests;

use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// DnParseError
///

#[derive(Debug, ThisError)]
pub enum DnParseError {
    #[error("empty name component in '{text}'")]
    EmptyComponent { text: String },

    #[error("component '{component}' has no '=' separator")]
    MissingSeparator { component: String },

    #[error("component '{component}' has an empty attribute type")]
    EmptyType { component: String },

    #[error("trailing escape character in '{text}'")]
    TrailingEscape { text: String },
}

///
/// Ava
///
/// One attribute-type/value assertion inside an RDN. Both the user-provided
/// and the normalized rendering of type and value are kept.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ava {
    utype: String,
    uvalue: String,
    ntype: String,
    nvalue: String,
}

impl Ava {
    #[must_use]
    pub fn new(attr_type: &str, value: &str) -> Self {
        Self {
            utype: attr_type.to_string(),
            uvalue: value.to_string(),
            ntype: normalize(attr_type),
            nvalue: normalize(value),
        }
    }

    #[must_use]
    pub fn attr_type(&self) -> &str {
        &self.ntype
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.uvalue
    }

    #[must_use]
    pub fn normalized_value(&self) -> &str {
        &self.nvalue
    }
}

///
/// Rdn
///
/// A relative name component: one or more AVAs (multi-valued RDNs join AVAs
/// with '+'). AVAs are stored in parse order for the user form; the
/// normalized form sorts them so equal RDNs normalize identically.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rdn {
    avas: Vec<Ava>,
}

impl Rdn {
    #[must_use]
    pub fn new(avas: Vec<Ava>) -> Self {
        Self { avas }
    }

    #[must_use]
    pub fn single(attr_type: &str, value: &str) -> Self {
        Self {
            avas: vec![Ava::new(attr_type, value)],
        }
    }

    /// Parse one RDN from its text form, e.g. `cn=link` or `cn=a+sn=b`.
    pub fn parse(text: &str) -> Result<Self, DnParseError> {
        let parts = split_unescaped(text, '+')?;
        let mut avas = Vec::with_capacity(parts.len());

        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                return Err(DnParseError::EmptyComponent {
                    text: text.to_string(),
                });
            }

            let mut halves = split_unescaped(part, '=')?;
            if halves.len() < 2 {
                return Err(DnParseError::MissingSeparator {
                    component: part.to_string(),
                });
            }
            // '=' inside the value is legal when escaped; anything after the
            // first separator belongs to the value.
            let attr_type = halves.remove(0);
            let value = halves.join("=");

            let attr_type = attr_type.trim();
            if attr_type.is_empty() {
                return Err(DnParseError::EmptyType {
                    component: part.to_string(),
                });
            }

            avas.push(Ava::new(attr_type, value.trim()));
        }

        Ok(Self { avas })
    }

    #[must_use]
    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    #[must_use]
    pub fn normalized(&self) -> String {
        let mut sorted: Vec<&Ava> = self.avas.iter().collect();
        sorted.sort_by(|a, b| (&a.ntype, &a.nvalue).cmp(&(&b.ntype, &b.nvalue)));

        sorted
            .iter()
            .map(|ava| format!("{}={}", ava.ntype, ava.nvalue))
            .collect::<Vec<_>>()
            .join("+")
    }

    #[must_use]
    pub fn user(&self) -> String {
        self.avas
            .iter()
            .map(|ava| format!("{}={}", ava.utype, ava.uvalue))
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Whether two RDNs are the same name under normalization.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user())
    }
}

///
/// Dn
///
/// A distinguished name: a sequence of RDNs held root-first, with cached
/// normalized and user-provided string renderings (leaf-first text order,
/// as written on the wire).
///

#[derive(Clone, Debug)]
pub struct Dn {
    rdns: Vec<Rdn>,
    norm: String,
    user: String,
}

impl Dn {
    /// Parse a DN from its text form, leaf-first, e.g. `ou=Sales,o=Root`.
    /// The empty string parses to the root DN (no components).
    pub fn parse(text: &str) -> Result<Self, DnParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::root());
        }

        let mut rdns = Vec::new();
        for component in split_unescaped(text, ',')? {
            rdns.push(Rdn::parse(&component)?);
        }
        // Text order is leaf-first; storage order is root-first.
        rdns.reverse();

        Ok(Self::from_rdns(rdns))
    }

    #[must_use]
    pub fn root() -> Self {
        Self::from_rdns(Vec::new())
    }

    #[must_use]
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        let norm = render(&rdns, Rdn::normalized);
        let user = render(&rdns, Rdn::user);

        Self { rdns, norm, user }
    }

    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.norm
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// The leaf RDN, if any.
    #[must_use]
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.last()
    }

    #[must_use]
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The DN with the leaf RDN stripped; `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.rdns.is_empty() {
            return None;
        }

        let mut rdns = self.rdns.clone();
        rdns.pop();

        Some(Self::from_rdns(rdns))
    }

    /// This DN extended by one child RDN.
    #[must_use]
    pub fn child(&self, rdn: Rdn) -> Self {
        let mut rdns = self.rdns.clone();
        rdns.push(rdn);

        Self::from_rdns(rdns)
    }

    /// This DN with its leaf RDN replaced.
    #[must_use]
    pub fn with_rdn(&self, rdn: Rdn) -> Self {
        let mut rdns = self.rdns.clone();
        rdns.pop();
        rdns.push(rdn);

        Self::from_rdns(rdns)
    }

    /// Whether `self` is `other` or lies under it (root-prefix match on
    /// normalized components).
    #[must_use]
    pub fn is_at_or_under(&self, other: &Self) -> bool {
        if other.rdns.len() > self.rdns.len() {
            return false;
        }

        self.rdns
            .iter()
            .zip(other.rdns.iter())
            .all(|(a, b)| a.matches(b))
    }

    /// Whether `self` lies strictly under `other`.
    #[must_use]
    pub fn is_under(&self, other: &Self) -> bool {
        self.rdns.len() > other.rdns.len() && self.is_at_or_under(other)
    }
}

impl Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user)
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.norm == other.norm
    }
}

impl Eq for Dn {}

/// Render a root-first component list into leaf-first text form.
fn render(rdns: &[Rdn], form: impl Fn(&Rdn) -> String) -> String {
    rdns.iter().rev().map(form).collect::<Vec<_>>().join(",")
}

/// Lowercase and trim one type or value for the normalized form. Attribute
/// values elsewhere in the engine normalize through this same rule so DN keys
/// and index keys agree.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Split on an unescaped separator, honoring backslash escapes. The escape
/// character is consumed; the escaped character is kept verbatim.
fn split_unescaped(text: &str, sep: char) -> Result<Vec<String>, DnParseError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(escaped) => current.push(escaped),
                None => {
                    return Err(DnParseError::TrailingEscape {
                        text: text.to_string(),
                    });
                }
            }
        } else if ch == sep {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    parts.push(current);

    Ok(parts)
}
