//! Module: master
//! Responsibility: the entry master table and id allocation.
//! Does not own: index maintenance or DN validation; callers hand ids in
//! good faith, this is an internal collaborator.

use std::collections::BTreeMap;

use crate::{entry::Entry, id::EntryId};

///
/// MasterTable
///
/// Maps an entry id to the full entry. Ids are allocated strictly
/// increasing and never reused, even after delete.
///

#[derive(Debug)]
pub struct MasterTable {
    rows: BTreeMap<EntryId, Entry>,
    next_id: EntryId,
}

impl MasterTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: EntryId::SUFFIX,
        }
    }

    /// Hand out the next id. The first call returns [`EntryId::SUFFIX`].
    pub fn allocate_id(&mut self) -> EntryId {
        let id = self.next_id;
        self.next_id = id.next();

        id
    }

    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.rows.get(&id)
    }

    #[must_use]
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.rows.get_mut(&id)
    }

    pub fn put(&mut self, id: EntryId, entry: Entry) {
        self.rows.insert(id, entry);
    }

    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        self.rows.remove(&id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

impl Default for MasterTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Dn;

    #[test]
    fn ids_start_at_the_suffix_id_and_never_repeat() {
        let mut master = MasterTable::new();

        let first = master.allocate_id();
        assert_eq!(first, EntryId::SUFFIX);

        let second = master.allocate_id();
        master.put(second, Entry::new(Dn::root()));
        master.remove(second);

        // Deleting does not recycle the id.
        let third = master.allocate_id();
        assert!(third > second);
    }
}
