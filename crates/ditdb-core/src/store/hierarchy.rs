//! Sub-level closure primitives: ancestor chains and closure membership.
//! The sub-level index is maintained incrementally; nothing here ever
//! recomputes the closure from scratch.

use crate::{id::EntryId, schema::SchemaView, store::Store};

impl<S: SchemaView> Store<S> {
    /// Ancestors tracked by the sub-level index, starting from `start`
    /// (inclusive) and walking parent links upward. The suffix entry and the
    /// virtual root terminate the walk and are not included: closure tuples
    /// are only kept for ancestors strictly below the suffix.
    pub(crate) fn tracked_ancestors(&self, start: Option<EntryId>) -> Vec<EntryId> {
        let mut chain = Vec::new();
        let mut cursor = start;

        while let Some(id) = cursor {
            if id == EntryId::SUFFIX {
                break;
            }
            chain.push(id);
            cursor = self.parent_id(id);
        }

        chain
    }

    /// The closure of an entry: itself plus every proper descendant, read
    /// straight off the sub-level index (the reflexive pair makes the entry
    /// its own first member).
    pub(crate) fn closure_of(&self, id: EntryId) -> Vec<EntryId> {
        self.sys.sub_level.forward_values(&id).collect()
    }

    /// Whether `candidate` lies inside the closure of `root` (i.e. is `root`
    /// or one of its descendants).
    pub(crate) fn in_closure(&self, root: EntryId, candidate: EntryId) -> bool {
        self.sys.sub_level.contains(&root, candidate)
    }

    /// Record the upward closure tuples for a freshly added entry, then its
    /// reflexive pair. The suffix entry gets neither.
    pub(crate) fn add_closure(&mut self, id: EntryId, parent: Option<EntryId>) {
        for ancestor in self.tracked_ancestors(parent) {
            self.sys.sub_level.add(ancestor, id);
        }
        if id != EntryId::SUFFIX {
            self.sys.sub_level.add(id, id);
        }
    }

    /// Splice the closure for a subtree relocation: every (ancestor,
    /// descendant) cross-product pair over the old ancestor chain goes, the
    /// cross-product over the new chain comes in. The inside of the moved
    /// subtree is untouched.
    pub(crate) fn splice_closure(
        &mut self,
        old_ancestors: &[EntryId],
        new_ancestors: &[EntryId],
        moved: EntryId,
    ) {
        let descendants = self.closure_of(moved);

        for ancestor in old_ancestors {
            for descendant in &descendants {
                self.sys.sub_level.drop(ancestor, *descendant);
            }
        }
        for ancestor in new_ancestors {
            for descendant in &descendants {
                self.sys.sub_level.add(*ancestor, *descendant);
            }
        }
    }
}
