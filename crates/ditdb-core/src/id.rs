//! Module: id
//! Responsibility: entry identifier newtype and its ordering contract.
//! Does not own: identifier allocation (master table) or DN resolution.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// EntryId
///
/// Opaque, totally ordered identifier assigned to an entry at add time.
/// Identifiers increase strictly and are never reused, so id order is
/// insertion order. The virtual parent of the suffix entry has no id; parent
/// positions use `Option<EntryId>` with `None` meaning "above the suffix".
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct EntryId(u64);

impl EntryId {
    /// The first id ever allocated, always held by the suffix entry.
    pub const SUFFIX: Self = Self(1);

    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Successor id, used by the allocator only.
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
