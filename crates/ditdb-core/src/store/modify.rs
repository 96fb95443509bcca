//! In-place attribute modification. Each operation re-derives index
//! consistency for exactly the attribute it touches; identity (id, DN,
//! position in the tree) is untouched.

use crate::{
    entry::{Attribute, ModOp, Modification},
    id::EntryId,
    name::{Dn, normalize},
    schema::SchemaView,
    store::{AT_ALIAS_TARGET, AT_ENTRY_CSN, AT_ENTRY_UUID, AT_OBJECT_CLASS, Store, StoreError},
};

impl<S: SchemaView> Store<S> {
    /// Apply one modification to the entry at `dn`.
    pub fn modify(&mut self, dn: &Dn, modification: &Modification) -> Result<(), StoreError> {
        let id = self.require_id(dn)?;

        match modification.op {
            ModOp::Add => self.modify_add(id, &modification.attribute),
            ModOp::Remove => self.modify_remove(id, &modification.attribute),
            ModOp::Replace => self.modify_replace(id, &modification.attribute),
        }
    }

    /// Add values to an attribute.
    fn modify_add(&mut self, id: EntryId, attribute: &Attribute) -> Result<(), StoreError> {
        let attr_id = attribute.id().to_string();

        // Alias targets validate before any tuple is written, so a rejected
        // target leaves the entry and the indices untouched.
        if attr_id == AT_ALIAS_TARGET {
            if let Some(target) = attribute.first() {
                let dn = self.entry_dn_required(id)?;
                self.add_alias_indices(id, &dn, target)?;
            }
        }

        match attr_id.as_str() {
            AT_OBJECT_CLASS => {
                for value in attribute.values() {
                    self.sys.object_class.add(normalize(value), id);
                }
            }
            AT_ENTRY_CSN => {
                for value in attribute.values() {
                    self.sys.entry_csn.add(normalize(value), id);
                }
            }
            AT_ENTRY_UUID => {
                for value in attribute.values() {
                    self.sys.entry_uuid.add(normalize(value), id);
                }
            }
            _ => {
                if let Some((oid, index)) = self.user_index_for_attr(&attr_id) {
                    for value in attribute.values() {
                        index.add(normalize(value), id);
                    }
                    self.sys.presence.add(oid, id);
                }
            }
        }

        let entry = self.master.get_mut(id).ok_or(StoreError::NoSuchEntry { id })?;
        entry.put(&attr_id, attribute.values().iter().cloned());

        Ok(())
    }

    /// Remove values from an attribute; an empty value set removes the
    /// attribute outright.
    fn modify_remove(&mut self, id: EntryId, attribute: &Attribute) -> Result<(), StoreError> {
        let attr_id = attribute.id().to_string();

        let Some(current) = self
            .master
            .get(id)
            .ok_or(StoreError::NoSuchEntry { id })?
            .get(&attr_id)
            .cloned()
        else {
            return Ok(());
        };

        let removing: Vec<String> = if attribute.is_empty() {
            current.values().to_vec()
        } else {
            attribute.values().to_vec()
        };

        match attr_id.as_str() {
            AT_OBJECT_CLASS => {
                for value in &removing {
                    self.sys.object_class.drop(&normalize(value), id);
                }
            }
            AT_ENTRY_CSN => {
                for value in &removing {
                    self.sys.entry_csn.drop(&normalize(value), id);
                }
            }
            AT_ENTRY_UUID => {
                for value in &removing {
                    self.sys.entry_uuid.drop(&normalize(value), id);
                }
            }
            _ => {
                if let Some((_, index)) = self.user_index_for_attr(&attr_id) {
                    for value in &removing {
                        index.drop(&normalize(value), id);
                    }
                }
            }
        }

        if attr_id == AT_ALIAS_TARGET {
            self.drop_alias_indices(id)?;
        }

        let entry = self.master.get_mut(id).ok_or(StoreError::NoSuchEntry { id })?;
        if attribute.is_empty() {
            entry.remove_attribute(&attr_id);
        } else {
            for value in &removing {
                entry.remove_value(&attr_id, value);
            }
        }
        let attribute_gone = entry.get(&attr_id).is_none();

        // Presence tracks "at least one value of an indexed attribute".
        if attribute_gone {
            if let Some(oid) = self.schema.attribute_oid(&attr_id) {
                if self.user.contains_key(&oid) {
                    self.sys.presence.drop(&oid, id);
                }
            }
        }

        Ok(())
    }

    /// Replace the attribute's value set; an empty replacement is a pure
    /// removal.
    fn modify_replace(&mut self, id: EntryId, attribute: &Attribute) -> Result<(), StoreError> {
        let attr_id = attribute.id().to_string();

        let current = self
            .master
            .get(id)
            .ok_or(StoreError::NoSuchEntry { id })?
            .get(&attr_id)
            .cloned();

        if attr_id == AT_ALIAS_TARGET {
            self.drop_alias_indices(id)?;
        }

        if let Some(current) = &current {
            match attr_id.as_str() {
                AT_OBJECT_CLASS => {
                    for value in current.values() {
                        self.sys.object_class.drop(&normalize(value), id);
                    }
                }
                AT_ENTRY_CSN => {
                    for value in current.values() {
                        self.sys.entry_csn.drop(&normalize(value), id);
                    }
                }
                AT_ENTRY_UUID => {
                    for value in current.values() {
                        self.sys.entry_uuid.drop(&normalize(value), id);
                    }
                }
                _ => {
                    if let Some((oid, index)) = self.user_index_for_attr(&attr_id) {
                        for value in current.values() {
                            index.drop(&normalize(value), id);
                        }
                        self.sys.presence.drop(&oid, id);
                    }
                }
            }
        }

        if !attribute.is_empty() {
            match attr_id.as_str() {
                AT_OBJECT_CLASS => {
                    for value in attribute.values() {
                        self.sys.object_class.add(normalize(value), id);
                    }
                }
                AT_ENTRY_CSN => {
                    for value in attribute.values() {
                        self.sys.entry_csn.add(normalize(value), id);
                    }
                }
                AT_ENTRY_UUID => {
                    for value in attribute.values() {
                        self.sys.entry_uuid.add(normalize(value), id);
                    }
                }
                _ => {
                    if let Some((oid, index)) = self.user_index_for_attr(&attr_id) {
                        for value in attribute.values() {
                            index.add(normalize(value), id);
                        }
                        self.sys.presence.add(oid, id);
                    }
                }
            }
        }

        let entry = self.master.get_mut(id).ok_or(StoreError::NoSuchEntry { id })?;
        entry.replace(attribute.clone());

        if attr_id == AT_ALIAS_TARGET {
            if let Some(target) = attribute.first() {
                let dn = self.entry_dn_required(id)?;
                let target = target.to_string();
                self.add_alias_indices(id, &dn, &target)?;
            }
        }

        Ok(())
    }

    fn entry_dn_required(&self, id: EntryId) -> Result<Dn, StoreError> {
        self.master
            .get(id)
            .map(|entry| entry.dn().clone())
            .ok_or(StoreError::NoSuchEntry { id })
    }
}
