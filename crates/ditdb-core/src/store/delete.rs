//! Entry deletion. Leaves only: a delete never cascades into descendants,
//! so callers sequence leaf-first and a non-leaf delete is rejected outright
//! rather than leaving the hierarchy indices undefined.

use crate::{
    entry::Entry,
    id::EntryId,
    name::normalize,
    schema::SchemaView,
    store::{AT_ENTRY_CSN, AT_ENTRY_UUID, AT_OBJECT_CLASS, Store, StoreError},
};

impl<S: SchemaView> Store<S> {
    /// Delete a leaf entry and every index tuple recorded for its id.
    /// Returns the removed entry.
    pub fn delete(&mut self, id: EntryId) -> Result<Entry, StoreError> {
        let entry = self
            .master
            .get(id)
            .ok_or(StoreError::NoSuchEntry { id })?
            .clone();

        if self.child_count(id) > 0 {
            return Err(StoreError::NotAllowedOnNonLeaf { id });
        }

        let parent = self.parent_id(id);
        let dn = entry.dn();

        if self.is_alias(id) {
            self.drop_alias_indices(id)?;
        }

        if let Some(classes) = entry.get(AT_OBJECT_CLASS) {
            for class in classes.values() {
                self.sys.object_class.drop(&normalize(class), id);
            }
        }

        self.sys.ndn.drop(&dn.normalized().to_string(), id);
        self.sys.updn.drop(&dn.user().to_string(), id);

        if let Some(csn) = entry.first(AT_ENTRY_CSN) {
            self.sys.entry_csn.drop(&normalize(csn), id);
        }
        if let Some(uuid) = entry.first(AT_ENTRY_UUID) {
            self.sys.entry_uuid.drop(&normalize(uuid), id);
        }

        // Upward closure tuples plus the reflexive pair (which the suffix
        // entry never had) all hang off the reverse side.
        self.sys.sub_level.drop_id(id);

        if let Some(parent_id) = parent {
            self.sys.one_level.drop(&parent_id, id);
        }

        for attr in entry.attributes() {
            let Some(oid) = self.schema.attribute_oid(attr.id()) else {
                continue;
            };
            let Some(index) = self.user.get_mut(&oid) else {
                continue;
            };

            for value in attr.values() {
                index.drop(&normalize(value), id);
            }
            self.sys.presence.drop(&oid, id);
        }

        self.master
            .remove(id)
            .ok_or(StoreError::NoSuchEntry { id })
    }
}
