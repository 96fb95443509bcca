//! Structural relocation: rename, move, and the DN cascade that pushes a new
//! name down through a subtree. The cascade is an explicit worklist, not
//! recursion, so arbitrarily deep trees cannot exhaust the stack; the
//! one-level index is acyclic, so every descendant is visited exactly once.

use tracing::debug;

use crate::{
    id::EntryId,
    name::{Dn, Rdn, normalize},
    schema::SchemaView,
    store::{Store, StoreError},
};

impl<S: SchemaView> Store<S> {
    /// Rename the leaf RDN of an entry in place, cascading the new DN to
    /// every descendant. With `delete_old_rdn`, old RDN values not carried
    /// over into the new RDN are removed from the entry and its indices.
    pub fn rename(&mut self, dn: &Dn, new_rdn: &Rdn, delete_old_rdn: bool) -> Result<(), StoreError> {
        let id = self.require_id(dn)?;
        if id == EntryId::SUFFIX {
            return Err(StoreError::NotAllowedOnSuffix);
        }

        let stored_dn = self.stored_dn(id)?;
        let new_dn = stored_dn.with_rdn(new_rdn.clone());
        if self.entry_id(&new_dn).is_some_and(|occupant| occupant != id) {
            return Err(StoreError::EntryAlreadyExists {
                dn: new_dn.user().to_string(),
            });
        }

        self.apply_rdn_change(id, &stored_dn, new_rdn, delete_old_rdn)?;
        self.cascade_dn(id, new_dn, false)
    }

    /// Move an entry (and its whole subtree) under a new parent, keeping its
    /// RDN.
    pub fn move_entry(&mut self, old_dn: &Dn, new_parent_dn: &Dn) -> Result<(), StoreError> {
        self.relocate(old_dn, new_parent_dn, None)
    }

    /// Move an entry under a new parent and give it a new RDN in the same
    /// operation.
    pub fn move_and_rename(
        &mut self,
        old_dn: &Dn,
        new_parent_dn: &Dn,
        new_rdn: &Rdn,
        delete_old_rdn: bool,
    ) -> Result<(), StoreError> {
        self.relocate(old_dn, new_parent_dn, Some((new_rdn, delete_old_rdn)))
    }

    fn relocate(
        &mut self,
        old_dn: &Dn,
        new_parent_dn: &Dn,
        rename: Option<(&Rdn, bool)>,
    ) -> Result<(), StoreError> {
        let id = self.require_id(old_dn)?;
        if id == EntryId::SUFFIX {
            return Err(StoreError::NotAllowedOnSuffix);
        }
        let old_parent = self
            .parent_id(id)
            .ok_or(StoreError::NotAllowedOnSuffix)?;
        let new_parent = self.require_id(new_parent_dn)?;

        // Relinking under the moved subtree itself would detach it from the
        // tree entirely; the one-level index must stay acyclic.
        if self.in_closure(id, new_parent) {
            return Err(StoreError::MoveIntoOwnSubtree {
                dn: old_dn.user().to_string(),
                new_parent: new_parent_dn.user().to_string(),
            });
        }

        let stored_dn = self.stored_dn(id)?;

        // The child's new DN hangs off the parent's stored user-provided DN,
        // not whatever form the caller passed in.
        let parent_dn = self.stored_dn(new_parent)?;
        let final_rdn = match rename {
            Some((new_rdn, _)) => new_rdn.clone(),
            None => stored_dn
                .rdn()
                .cloned()
                .ok_or(StoreError::NotAllowedOnSuffix)?,
        };
        let new_dn = parent_dn.child(final_rdn);
        if self.entry_id(&new_dn).is_some_and(|occupant| occupant != id) {
            return Err(StoreError::EntryAlreadyExists {
                dn: new_dn.user().to_string(),
            });
        }

        if let Some((new_rdn, delete_old_rdn)) = rename {
            self.apply_rdn_change(id, &stored_dn, new_rdn, delete_old_rdn)?;
        }

        // Scope tuples tied to ancestors above the old location go first;
        // the cascade re-derives them under the new ancestry.
        self.drop_moved_alias_tuples(id)?;

        // The old ancestor chain has to be read before the relink severs it.
        let old_ancestors = self.tracked_ancestors(Some(old_parent));

        self.sys.one_level.drop(&old_parent, id);
        self.sys.one_level.add(new_parent, id);

        let new_ancestors = self.tracked_ancestors(Some(new_parent));
        self.splice_closure(&old_ancestors, &new_ancestors, id);

        self.cascade_dn(id, new_dn, true)
    }

    /// Push a new DN down through an entry and its descendants, re-keying
    /// the DN indices and updating every stored entry. With `is_move`,
    /// aliases encountered on the way re-establish their scope tuples under
    /// the new ancestry.
    pub(crate) fn cascade_dn(
        &mut self,
        id: EntryId,
        new_dn: Dn,
        is_move: bool,
    ) -> Result<(), StoreError> {
        let mut visited = 0usize;
        let mut work = vec![(id, new_dn)];

        while let Some((id, dn)) = work.pop() {
            visited += 1;

            if let Some(old_ndn) = self.sys.ndn.reverse_lookup(id).cloned() {
                self.sys.ndn.drop(&old_ndn, id);
            }
            self.sys.ndn.add(dn.normalized().to_string(), id);

            if let Some(old_updn) = self.sys.updn.reverse_lookup(id).cloned() {
                self.sys.updn.drop(&old_updn, id);
            }
            self.sys.updn.add(dn.user().to_string(), id);

            if is_move && self.is_alias(id) {
                self.reapply_alias_scope(id, &dn)?;
            }

            if let Some(entry) = self.master.get_mut(id) {
                entry.set_dn(dn.clone());
            }

            let children: Vec<EntryId> = self.list(id).collect();
            for child in children {
                let Some(child_rdn) = self
                    .master
                    .get(child)
                    .and_then(|entry| entry.dn().rdn().cloned())
                else {
                    continue;
                };
                work.push((child, dn.child(child_rdn)));
            }
        }

        debug!(entries = visited, "dn cascade complete");

        Ok(())
    }

    /// Index and entry updates for an RDN change: new RDN values come in;
    /// with delete-old-rdn, old values not shared with the new RDN go out.
    fn apply_rdn_change(
        &mut self,
        id: EntryId,
        old_dn: &Dn,
        new_rdn: &Rdn,
        delete_old_rdn: bool,
    ) -> Result<(), StoreError> {
        for ava in new_rdn.avas() {
            let entry = self.master.get_mut(id).ok_or(StoreError::NoSuchEntry { id })?;
            entry.add_value(ava.attr_type(), ava.value());

            if let Some((oid, index)) = self.user_index_for_attr(ava.attr_type()) {
                index.add(normalize(ava.value()), id);
                self.sys.presence.add(oid, id);
            }
        }

        if !delete_old_rdn {
            return Ok(());
        }

        let Some(old_rdn) = old_dn.rdn().cloned() else {
            return Ok(());
        };

        for ava in old_rdn.avas() {
            let kept = new_rdn.avas().iter().any(|new| {
                new.attr_type() == ava.attr_type()
                    && new.normalized_value() == ava.normalized_value()
            });
            if kept {
                continue;
            }

            let entry = self.master.get_mut(id).ok_or(StoreError::NoSuchEntry { id })?;
            entry.remove_value(ava.attr_type(), ava.value());
            let attribute_gone = entry.get(ava.attr_type()).is_none();

            if let Some((oid, index)) = self.user_index_for_attr(ava.attr_type()) {
                index.drop(&normalize(ava.value()), id);
                if attribute_gone {
                    self.sys.presence.drop(&oid, id);
                }
            }
        }

        Ok(())
    }

    fn stored_dn(&self, id: EntryId) -> Result<Dn, StoreError> {
        self.master
            .get(id)
            .map(|entry| entry.dn().clone())
            .ok_or(StoreError::NoSuchEntry { id })
    }
}
