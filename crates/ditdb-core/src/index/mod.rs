//! Module: index
//! Responsibility: the named forward/reverse index pair over one attribute.
//! Does not own: which tuples belong in the index (store algorithms decide).

#[cfg(test)]
mod tests;

use crate::{
    id::EntryId,
    schema::Oid,
    tree::{TupleCursor, TupleTree},
};

///
/// Index
///
/// A pair of tuple trees bound to one attribute OID for its lifetime: a
/// forward tree (key -> id, duplicates allowed) and a reverse tree
/// (id -> key). The reverse side is single-valued except for the
/// hierarchy-shaped indices, where one id fans out to many keys.
///
/// The binding is fixed at construction; there is no rebinding surface.
///

#[derive(Debug)]
pub struct Index<K> {
    attribute: Oid,
    forward: TupleTree<K, EntryId>,
    reverse: TupleTree<EntryId, K>,
}

impl<K> Index<K>
where
    K: Clone + Ord,
{
    /// An index whose reverse side keeps one key per id.
    #[must_use]
    pub fn new(attribute: Oid) -> Self {
        Self {
            attribute,
            forward: TupleTree::with_duplicates(),
            reverse: TupleTree::new(),
        }
    }

    /// An index whose reverse side fans out (one-level, sub-level, and the
    /// alias scope indices).
    #[must_use]
    pub fn hierarchical(attribute: Oid) -> Self {
        Self {
            attribute,
            forward: TupleTree::with_duplicates(),
            reverse: TupleTree::with_duplicates(),
        }
    }

    #[must_use]
    pub const fn attribute(&self) -> &Oid {
        &self.attribute
    }

    /// Record one (key, id) tuple on both sides. Idempotent per tuple.
    pub fn add(&mut self, key: K, id: EntryId) {
        self.forward.put(key.clone(), id);
        self.reverse.put(id, key);
    }

    /// Drop one (key, id) tuple from both sides.
    pub fn drop(&mut self, key: &K, id: EntryId) {
        self.forward.remove(key, &id);
        self.reverse.remove(&id, key);
    }

    /// Drop every tuple recorded for an id.
    pub fn drop_id(&mut self, id: EntryId) {
        let keys: Vec<K> = self.reverse.values(&id).cloned().collect();
        for key in &keys {
            self.forward.remove(key, &id);
        }
        self.reverse.remove_key(&id);
    }

    /// The least id recorded under a key.
    #[must_use]
    pub fn forward_lookup(&self, key: &K) -> Option<EntryId> {
        self.forward.get(key).copied()
    }

    /// All ids under a key, in id (= insertion) order. The iterator borrows
    /// the index only, not the probe key.
    pub fn forward_values<'a>(&'a self, key: &K) -> impl Iterator<Item = EntryId> + use<'a, K> {
        self.forward.values(key).copied()
    }

    /// The least key recorded for an id.
    #[must_use]
    pub fn reverse_lookup(&self, id: EntryId) -> Option<&K> {
        self.reverse.get(&id)
    }

    /// All keys recorded for an id, in key order.
    pub fn reverse_values(&self, id: EntryId) -> impl Iterator<Item = &K> {
        self.reverse.values(&id)
    }

    #[must_use]
    pub fn contains(&self, key: &K, id: EntryId) -> bool {
        self.forward.contains(key, &id)
    }

    #[must_use]
    pub fn contains_id(&self, id: EntryId) -> bool {
        self.reverse.contains_key(&id)
    }

    /// Total tuple count, for the search engine's cost estimation.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.forward.len()
    }

    /// Tuple count under one key.
    #[must_use]
    pub fn count_for_key(&self, key: &K) -> usize {
        self.forward.count_for_key(key)
    }

    #[must_use]
    pub fn forward_cursor(&self) -> TupleCursor<'_, K, EntryId> {
        self.forward.cursor()
    }

    #[must_use]
    pub fn forward_cursor_at(&self, key: &K) -> TupleCursor<'_, K, EntryId> {
        self.forward.cursor_at(key)
    }

    #[must_use]
    pub fn reverse_cursor_at(&self, id: EntryId) -> TupleCursor<'_, EntryId, K> {
        self.reverse.cursor_at(&id)
    }
}
