//! Module: tree
//! Responsibility: the ordered keyed multimap backing every index.
//! Does not own: attribute semantics or id allocation.
//!
//! Invariants:
//! - Element count equals the number of stored (key, value) tuples.
//! - In single-value mode a key maps to at most one value.
//! - Re-inserting an existing (key, value) pair never changes the count.

#[cfg(test)]
mod tests;

use std::{
    collections::{BTreeMap, BTreeSet},
    ops::Bound::{Excluded, Unbounded},
};

///
/// TupleTree
///
/// Balanced-tree-backed sorted container mapping a key to one value or, in
/// duplicates mode, to an ordered set of values. Lookups, range positioning,
/// and cursors all run in key order (and value order within a key).
///

#[derive(Clone, Debug)]
pub struct TupleTree<K, V> {
    map: BTreeMap<K, BTreeSet<V>>,
    len: usize,
    dups: bool,
}

impl<K, V> TupleTree<K, V>
where
    K: Clone + Ord,
    V: Clone + Ord,
{
    /// Single-value mode: `put` on an occupied key replaces its value.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            len: 0,
            dups: false,
        }
    }

    /// Duplicates mode: a key holds an ordered set of values.
    #[must_use]
    pub fn with_duplicates() -> Self {
        Self {
            map: BTreeMap::new(),
            len: 0,
            dups: true,
        }
    }

    #[must_use]
    pub const fn allows_duplicates(&self) -> bool {
        self.dups
    }

    /// Total number of stored tuples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert one tuple. Returns whether the tree changed; re-inserting an
    /// existing pair is a no-op.
    pub fn put(&mut self, key: K, value: V) -> bool {
        let set = self.map.entry(key).or_default();

        if !self.dups && !set.is_empty() {
            if set.contains(&value) {
                return false;
            }
            // Replacement, not growth.
            set.clear();
            set.insert(value);
            return true;
        }

        let inserted = set.insert(value);
        if inserted {
            self.len += 1;
        }

        inserted
    }

    /// The value for a key; under duplicates, the minimum value.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key).and_then(BTreeSet::first)
    }

    /// All values for a key in value order. The iterator borrows the tree
    /// only, not the probe key.
    pub fn values<'a>(&'a self, key: &K) -> impl Iterator<Item = &'a V> + use<'a, K, V> {
        self.map.get(key).into_iter().flatten()
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    #[must_use]
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.map.get(key).is_some_and(|set| set.contains(value))
    }

    #[must_use]
    pub fn count_for_key(&self, key: &K) -> usize {
        self.map.get(key).map_or(0, BTreeSet::len)
    }

    /// Remove every tuple under a key; returns how many went.
    pub fn remove_key(&mut self, key: &K) -> usize {
        let removed = self.map.remove(key).map_or(0, |set| set.len());
        self.len -= removed;

        removed
    }

    /// Remove one tuple; returns whether it was present.
    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        let Some(set) = self.map.get_mut(key) else {
            return false;
        };

        let removed = set.remove(value);
        if removed {
            self.len -= 1;
            if set.is_empty() {
                self.map.remove(key);
            }
        }

        removed
    }

    /// The least tuple with key >= the probe.
    #[must_use]
    pub fn first_at_or_after(&self, key: &K) -> Option<(&K, &V)> {
        self.map
            .range(key..)
            .next()
            .and_then(|(k, set)| set.first().map(|v| (k, v)))
    }

    /// The greatest tuple with key <= the probe.
    #[must_use]
    pub fn last_at_or_before(&self, key: &K) -> Option<(&K, &V)> {
        self.map
            .range(..=key)
            .next_back()
            .and_then(|(k, set)| set.last().map(|v| (k, v)))
    }

    /// A cursor positioned before the first tuple.
    #[must_use]
    pub fn cursor(&self) -> TupleCursor<'_, K, V> {
        TupleCursor {
            tree: self,
            pos: Pos::BeforeFirst,
        }
    }

    /// A cursor positioned just before the first tuple whose key is >= the
    /// probe key.
    #[must_use]
    pub fn cursor_at(&self, key: &K) -> TupleCursor<'_, K, V> {
        let mut cursor = self.cursor();
        cursor.before_key(key);

        cursor
    }

    fn first_tuple(&self) -> Option<(&K, &V)> {
        self.map
            .first_key_value()
            .and_then(|(k, set)| set.first().map(|v| (k, v)))
    }

    fn last_tuple(&self) -> Option<(&K, &V)> {
        self.map
            .last_key_value()
            .and_then(|(k, set)| set.last().map(|v| (k, v)))
    }

    fn tuple_after(&self, key: &K, value: &V) -> Option<(&K, &V)> {
        if let Some(set) = self.map.get(key) {
            if let Some(v) = set.range((Excluded(value), Unbounded)).next() {
                if let Some((k, _)) = self.map.get_key_value(key) {
                    return Some((k, v));
                }
            }
        }

        self.map
            .range((Excluded(key), Unbounded))
            .next()
            .and_then(|(k, set)| set.first().map(|v| (k, v)))
    }

    fn tuple_before(&self, key: &K, value: &V) -> Option<(&K, &V)> {
        if let Some(set) = self.map.get(key) {
            if let Some(v) = set.range((Unbounded, Excluded(value))).next_back() {
                if let Some((k, _)) = self.map.get_key_value(key) {
                    return Some((k, v));
                }
            }
        }

        self.map
            .range((Unbounded, Excluded(key)))
            .next_back()
            .and_then(|(k, set)| set.last().map(|v| (k, v)))
    }

    /// The greatest tuple whose key is strictly below the probe, used to
    /// seat a cursor in front of a key.
    fn tuple_before_key(&self, key: &K) -> Option<(&K, &V)> {
        self.map
            .range((Unbounded, Excluded(key)))
            .next_back()
            .and_then(|(k, set)| set.last().map(|v| (k, v)))
    }
}

impl<K, V> Default for TupleTree<K, V>
where
    K: Clone + Ord,
    V: Clone + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

///
/// Pos
///

#[derive(Clone, Debug)]
enum Pos<K, V> {
    BeforeFirst,
    AfterLast,
    At(K, V),
}

///
/// TupleCursor
///
/// Bidirectional, restartable walk over (key, value) tuples. The cursor
/// borrows the tree, so the tree cannot change underneath it; its positional
/// state is released on drop.
///

#[derive(Debug)]
pub struct TupleCursor<'a, K, V> {
    tree: &'a TupleTree<K, V>,
    pos: Pos<K, V>,
}

impl<K, V> TupleCursor<'_, K, V>
where
    K: Clone + Ord,
    V: Clone + Ord,
{
    /// Restart before the first tuple.
    pub fn before_first(&mut self) {
        self.pos = Pos::BeforeFirst;
    }

    /// Restart after the last tuple.
    pub fn after_last(&mut self) {
        self.pos = Pos::AfterLast;
    }

    /// Position just before the first tuple whose key is >= the probe, so
    /// the next `next()` yields it.
    pub fn before_key(&mut self, key: &K) {
        self.pos = match self.tree.tuple_before_key(key) {
            Some((k, v)) => Pos::At(k.clone(), v.clone()),
            None => Pos::BeforeFirst,
        };
    }

    /// Advance; `None` once past the last tuple.
    // Not an Iterator: the walk is bidirectional and restartable.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(K, V)> {
        let tuple = match &self.pos {
            Pos::BeforeFirst => self.tree.first_tuple(),
            Pos::AfterLast => None,
            Pos::At(k, v) => self.tree.tuple_after(k, v),
        };

        match tuple {
            Some((k, v)) => {
                let out = (k.clone(), v.clone());
                self.pos = Pos::At(out.0.clone(), out.1.clone());
                Some(out)
            }
            None => {
                self.pos = Pos::AfterLast;
                None
            }
        }
    }

    /// Step back; `None` once before the first tuple.
    pub fn prev(&mut self) -> Option<(K, V)> {
        let tuple = match &self.pos {
            Pos::BeforeFirst => None,
            Pos::AfterLast => self.tree.last_tuple(),
            Pos::At(k, v) => self.tree.tuple_before(k, v),
        };

        match tuple {
            Some((k, v)) => {
                let out = (k.clone(), v.clone());
                self.pos = Pos::At(out.0.clone(), out.1.clone());
                Some(out)
            }
            None => {
                self.pos = Pos::BeforeFirst;
                None
            }
        }
    }
}
