//! Alias index maintenance. An alias contributes three kinds of tuples: its
//! (target-DN, alias-id) record, a one-level scope tuple at its parent, and
//! subtree scope tuples at ancestors that cannot see the target otherwise.
//! Removal always recomputes the tuples this one alias contributed — never a
//! blanket sweep by target, since several aliases may share a target.

use crate::{
    id::EntryId,
    name::Dn,
    schema::SchemaView,
    store::{Store, StoreError},
};

/// Scope tuples one alias contributes: at most one one-level tuple and the
/// subtree tuples for each qualifying ancestor. All pairs are
/// (ancestor id, target id).
struct ScopeTuples {
    one_level: Option<(EntryId, EntryId)>,
    subtree: Vec<(EntryId, EntryId)>,
}

impl<S: SchemaView> Store<S> {
    /// Whether an id currently has an alias-target record.
    pub(crate) fn is_alias(&self, id: EntryId) -> bool {
        self.sys.alias.contains_id(id)
    }

    /// Validate and record every index contribution of a new alias.
    /// Validation runs to completion before the first tuple is written, so a
    /// rejected alias leaves nothing behind.
    pub(crate) fn add_alias_indices(
        &mut self,
        alias_id: EntryId,
        alias_dn: &Dn,
        target_raw: &str,
    ) -> Result<(), StoreError> {
        let target_dn = Dn::parse(target_raw)?;

        // Cycle: the target is the alias itself or one of its ancestors.
        if alias_dn.is_at_or_under(&target_dn) {
            return Err(StoreError::AliasCycle {
                alias: alias_dn.user().to_string(),
                target: target_dn.user().to_string(),
            });
        }

        if !target_dn.is_at_or_under(&self.suffix) {
            return Err(StoreError::AliasOutOfScope {
                target: target_dn.user().to_string(),
                suffix: self.suffix.user().to_string(),
            });
        }

        let target_id =
            self.entry_id(&target_dn)
                .ok_or_else(|| StoreError::AliasDangling {
                    alias: alias_dn.user().to_string(),
                    target: target_dn.user().to_string(),
                })?;

        // Chaining: the target must not itself be an alias.
        if self.is_alias(target_id) {
            return Err(StoreError::AliasChain {
                alias: alias_dn.user().to_string(),
                target: target_dn.user().to_string(),
            });
        }

        self.sys
            .alias
            .add(target_dn.normalized().to_string(), alias_id);

        let tuples = self.scope_tuples(alias_dn, &target_dn, target_id);
        if let Some((parent, target)) = tuples.one_level {
            self.sys.one_alias.add(parent, target);
        }
        for (ancestor, target) in tuples.subtree {
            self.sys.sub_alias.add(ancestor, target);
        }

        Ok(())
    }

    /// Remove every index contribution of one alias. A no-op for ids with no
    /// alias record.
    pub(crate) fn drop_alias_indices(&mut self, alias_id: EntryId) -> Result<(), StoreError> {
        let Some(target_norm) = self.sys.alias.reverse_lookup(alias_id).cloned() else {
            return Ok(());
        };

        let alias_dn = match self.master.get(alias_id) {
            Some(entry) => entry.dn().clone(),
            None => return Err(StoreError::NoSuchEntry { id: alias_id }),
        };
        let target_dn = Dn::parse(&target_norm)?;

        // A target deleted out from under its aliases leaves no scope tuples
        // to reverse; only the target record itself remains to drop.
        if let Some(target_id) = self.entry_id(&target_dn) {
            let tuples = self.scope_tuples(&alias_dn, &target_dn, target_id);
            if let Some((parent, target)) = tuples.one_level {
                self.sys.one_alias.drop(&parent, target);
            }
            for (ancestor, target) in tuples.subtree {
                self.sys.sub_alias.drop(&ancestor, target);
            }
        }

        self.sys.alias.drop(&target_norm, alias_id);

        Ok(())
    }

    /// Re-derive and record the scope tuples of an alias from its (possibly
    /// new) DN. Tuples that survived a relocation are re-put idempotently.
    pub(crate) fn reapply_alias_scope(
        &mut self,
        alias_id: EntryId,
        alias_dn: &Dn,
    ) -> Result<(), StoreError> {
        let Some(target_norm) = self.sys.alias.reverse_lookup(alias_id).cloned() else {
            return Ok(());
        };
        let target_dn = Dn::parse(&target_norm)?;
        let Some(target_id) = self.entry_id(&target_dn) else {
            return Ok(());
        };

        let tuples = self.scope_tuples(alias_dn, &target_dn, target_id);
        if let Some((parent, target)) = tuples.one_level {
            self.sys.one_alias.add(parent, target);
        }
        for (ancestor, target) in tuples.subtree {
            self.sys.sub_alias.add(ancestor, target);
        }

        Ok(())
    }

    /// Before a subtree relocation: drop the scope tuples of every alias at
    /// or under the moved entry whose ancestor side lies strictly above it.
    /// The DN cascade re-establishes them under the new ancestry; tuples tied
    /// to ancestors inside the subtree stay valid and are left alone.
    pub(crate) fn drop_moved_alias_tuples(&mut self, moved: EntryId) -> Result<(), StoreError> {
        for id in self.closure_of(moved) {
            let Some(target_norm) = self.sys.alias.reverse_lookup(id).cloned() else {
                continue;
            };

            let alias_dn = match self.master.get(id) {
                Some(entry) => entry.dn().clone(),
                None => continue,
            };
            let target_dn = Dn::parse(&target_norm)?;
            let Some(target_id) = self.entry_id(&target_dn) else {
                continue;
            };

            let tuples = self.scope_tuples(&alias_dn, &target_dn, target_id);
            if let Some((parent, target)) = tuples.one_level {
                if !self.in_closure(moved, parent) {
                    self.sys.one_alias.drop(&parent, target);
                }
            }
            for (ancestor, target) in tuples.subtree {
                if !self.in_closure(moved, ancestor) {
                    self.sys.sub_alias.drop(&ancestor, target);
                }
            }
        }

        Ok(())
    }

    /// Compute the scope tuples an alias at `alias_dn` contributes for a
    /// resolved target. Ancestors are resolved by DN so this works both
    /// before the alias's own one-level tuple exists (add) and after it is
    /// gone (delete).
    fn scope_tuples(&self, alias_dn: &Dn, target_dn: &Dn, target_id: EntryId) -> ScopeTuples {
        let mut tuples = ScopeTuples {
            one_level: None,
            subtree: Vec::new(),
        };

        let Some(parent_dn) = alias_dn.parent() else {
            return tuples;
        };

        // One-level scope: the alias's parent sees the target through a
        // one-level search unless it is already a proper ancestor of the
        // target's parent (the target would then sit deeper than one level).
        if let Some(parent_id) = self.entry_id(&parent_dn) {
            let parent_covers_target = target_dn
                .parent()
                .is_some_and(|target_parent| target_parent.is_under(&parent_dn));

            if !parent_covers_target {
                tuples.one_level = Some((parent_id, target_id));
            }
        }

        // Subtree scope: every ancestor strictly between the alias and the
        // suffix that is not itself an ancestor of the target.
        let mut ancestor = Some(parent_dn);
        while let Some(dn) = ancestor {
            if dn.len() <= self.suffix.len() {
                break;
            }
            if !target_dn.is_under(&dn) {
                if let Some(ancestor_id) = self.entry_id(&dn) {
                    tuples.subtree.push((ancestor_id, target_id));
                }
            }
            ancestor = dn.parent();
        }

        tuples
    }
}
