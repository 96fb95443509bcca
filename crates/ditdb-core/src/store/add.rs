//! Entry addition: parent resolution, schema checks, and population of every
//! affected index before the entry lands in the master table.

use crate::{
    entry::Entry,
    id::EntryId,
    name::normalize,
    schema::{SchemaView, well_known::ALIAS_OBJECT_CLASS_VALUE},
    store::{AT_ALIAS_TARGET, AT_ENTRY_CSN, AT_ENTRY_UUID, AT_OBJECT_CLASS, Store, StoreError},
};

impl<S: SchemaView> Store<S> {
    /// Add an entry under its DN's parent. The entry is consumed; the caller
    /// keeps only the returned id.
    pub fn add(&mut self, entry: Entry) -> Result<EntryId, StoreError> {
        let dn = entry.dn().clone();
        let ndn = dn.normalized().to_string();

        if self.sys.ndn.forward_lookup(&ndn).is_some() {
            return Err(StoreError::EntryAlreadyExists {
                dn: dn.user().to_string(),
            });
        }

        // Parent: the suffix entry hangs off the virtual root; everything
        // else must resolve its parent inside this naming context.
        let parent = if dn == self.suffix {
            None
        } else {
            if !dn.is_under(&self.suffix) {
                return Err(StoreError::NoSuchObject {
                    dn: dn.user().to_string(),
                });
            }
            let parent_dn = dn.parent().ok_or_else(|| StoreError::NoSuchObject {
                dn: dn.user().to_string(),
            })?;

            Some(self.require_id(&parent_dn)?)
        };

        let classes = entry
            .get(AT_OBJECT_CLASS)
            .filter(|attr| !attr.is_empty())
            .ok_or_else(|| StoreError::MissingObjectClass {
                dn: dn.user().to_string(),
            })?
            .values()
            .to_vec();

        let csn = required_value(&entry, AT_ENTRY_CSN, "entryCSN")?;
        let uuid = required_value(&entry, AT_ENTRY_UUID, "entryUUID")?;

        let is_alias = classes
            .iter()
            .any(|c| normalize(c) == ALIAS_OBJECT_CLASS_VALUE);
        let alias_target = if is_alias {
            Some(required_value(&entry, AT_ALIAS_TARGET, "aliasedObjectName")?)
        } else {
            None
        };

        let id = self.master.allocate_id();

        // Alias handling goes first: it validates before writing, so a
        // rejected alias leaves no tuples behind (the allocated id is simply
        // abandoned; ids are never reused anyway).
        if let Some(target) = alias_target {
            self.add_alias_indices(id, &dn, &target)?;
        }

        for class in &classes {
            self.sys.object_class.add(normalize(class), id);
        }

        self.sys.ndn.add(ndn, id);
        self.sys.updn.add(dn.user().to_string(), id);
        self.sys.entry_csn.add(normalize(&csn), id);
        self.sys.entry_uuid.add(normalize(&uuid), id);

        if let Some(parent_id) = parent {
            self.sys.one_level.add(parent_id, id);
        }
        self.add_closure(id, parent);

        for attr in entry.attributes() {
            let Some(oid) = self.schema.attribute_oid(attr.id()) else {
                continue;
            };
            let Some(index) = self.user.get_mut(&oid) else {
                continue;
            };

            for value in attr.values() {
                index.add(normalize(value), id);
            }
            self.sys.presence.add(oid, id);
        }

        self.master.put(id, entry);

        Ok(id)
    }
}

fn required_value(entry: &Entry, attr: &str, display: &'static str) -> Result<String, StoreError> {
    entry
        .first(attr)
        .map(ToString::to_string)
        .ok_or_else(|| StoreError::MissingRequiredAttribute {
            dn: entry.dn().user().to_string(),
            attr: display,
        })
}
