//! End-to-end exercises of a partition: lifecycle, hierarchy bookkeeping,
//! alias scope, and operational-attribute stamping.

use ditdb::prelude::*;

fn dn(text: &str) -> Dn {
    Dn::parse(text).unwrap()
}

fn partition() -> Partition<SchemaRegistry> {
    let mut partition = Partition::new(
        PartitionConfig::new("o=Root")
            .index_attribute("cn")
            .index_attribute("ou"),
    );
    partition.initialize(SchemaRegistry::standard()).unwrap();
    partition
        .add(Entry::new(dn("o=Root")).with("objectClass", ["organization"]))
        .unwrap();

    partition
}

fn unit(dn_text: &str) -> Entry {
    Entry::new(dn(dn_text)).with("objectClass", ["organizationalUnit"])
}

fn alias(dn_text: &str, target: &str) -> Entry {
    Entry::new(dn(dn_text))
        .with("objectClass", ["alias"])
        .with("aliasedObjectName", [target])
}

#[test]
fn lifecycle_gates_every_operation() {
    let mut partition: Partition<SchemaRegistry> =
        Partition::new(PartitionConfig::new("o=Root"));

    assert!(!partition.is_initialized());
    assert!(matches!(
        partition.count(),
        Err(PartitionError::StateViolation { .. })
    ));
    assert!(matches!(
        partition.add(unit("o=Root")),
        Err(PartitionError::StateViolation { .. })
    ));

    partition.initialize(SchemaRegistry::standard()).unwrap();
    assert!(partition.is_initialized());

    // Double initialize and post-init reconfiguration are both violations.
    assert!(matches!(
        partition.initialize(SchemaRegistry::standard()),
        Err(PartitionError::StateViolation { .. })
    ));
    assert!(matches!(
        partition.set_config(PartitionConfig::new("o=Other")),
        Err(PartitionError::StateViolation { .. })
    ));

    partition.destroy();
    assert!(!partition.is_initialized());
    partition.initialize(SchemaRegistry::standard()).unwrap();
}

#[test]
fn add_stamps_missing_operational_attributes() {
    let mut partition = partition();
    let id = partition.add(unit("ou=Sales,o=Root")).unwrap();

    let entry = partition.lookup(id).unwrap().unwrap();
    let csn = entry.first("entryCSN").unwrap();
    let uuid = entry.first("entryUUID").unwrap();

    // CSN carries the replica id in its third field.
    assert!(csn.contains("#001#"));
    // UUID in 8-4-4-4-12 form.
    let segments: Vec<&str> = uuid.split('-').collect();
    assert_eq!(
        segments.iter().map(|s| s.len()).collect::<Vec<_>>(),
        vec![8, 4, 4, 4, 12]
    );

    // Caller-supplied values win over stamping.
    let supplied = partition
        .add(
            unit("ou=Eng,o=Root")
                .with("entryCSN", ["20240101000000.000001Z#000000#00f#000000"])
                .with("entryUUID", ["d8f00d00-0000-4000-8000-000000000001"]),
        )
        .unwrap();
    let entry = partition.lookup(supplied).unwrap().unwrap();
    assert_eq!(
        entry.first("entryCSN"),
        Some("20240101000000.000001Z#000000#00f#000000")
    );
}

#[test]
fn hierarchy_scenario_children_then_move() {
    let mut partition = partition();

    let sales = partition.add(unit("ou=Sales,o=Root")).unwrap();
    let eng = partition.add(unit("ou=Eng,o=Root")).unwrap();
    let suffix = partition.entry_id(&dn("o=Root")).unwrap().unwrap();

    assert_eq!(suffix, EntryId::SUFFIX);
    assert_eq!(sales.as_u64(), 2);
    assert_eq!(eng.as_u64(), 3);
    assert_eq!(partition.child_count(suffix).unwrap(), 2);
    assert_eq!(partition.children(suffix).unwrap(), vec![sales, eng]);

    partition
        .move_entry(&dn("ou=Eng,o=Root"), &dn("ou=Sales,o=Root"))
        .unwrap();

    assert_eq!(partition.parent_id(eng).unwrap(), Some(sales));
    assert_eq!(partition.child_count(suffix).unwrap(), 1);
    assert_eq!(
        partition.entry_id(&dn("ou=Eng,ou=Sales,o=Root")).unwrap(),
        Some(eng)
    );
}

#[test]
fn alias_scenario_scope_tuple_at_the_parent() {
    let mut partition = partition();

    let sales = partition.add(unit("ou=Sales,o=Root")).unwrap();
    let link = partition
        .add(alias("cn=link,o=Root", "ou=Sales,o=Root"))
        .unwrap();
    // A second alias to the same target, one level deeper.
    partition.add(unit("ou=Eng,o=Root")).unwrap();
    partition
        .add(alias("cn=link2,ou=Eng,o=Root", "ou=Sales,o=Root"))
        .unwrap();

    let store = partition.raw().unwrap();
    assert_eq!(
        store.one_alias_index().reverse_lookup(sales),
        Some(&EntryId::SUFFIX)
    );

    partition.delete(link).unwrap();

    // The suffix-level tuple is gone; the deeper alias's tuples survive.
    let store = partition.raw().unwrap();
    assert!(!store.one_alias_index().contains(&EntryId::SUFFIX, sales));
    assert!(store.alias_index().contains_id(
        partition.entry_id(&dn("cn=link2,ou=Eng,o=Root")).unwrap().unwrap()
    ));
    assert!(store.sub_alias_index().reverse_values(sales).count() > 0);
}

#[test]
fn rename_and_move_compose_through_the_facade() {
    let mut partition = partition();

    partition.add(unit("ou=Sales,o=Root")).unwrap();
    let eng = partition
        .add(unit("ou=Eng,o=Root").with("ou", ["Eng"]))
        .unwrap();
    let kim = partition
        .add(
            Entry::new(dn("cn=kim,ou=Eng,o=Root"))
                .with("objectClass", ["person"])
                .with("cn", ["kim"]),
        )
        .unwrap();

    partition
        .move_and_rename(
            &dn("ou=Eng,o=Root"),
            &dn("ou=Sales,o=Root"),
            &Rdn::single("ou", "Engineering"),
            true,
        )
        .unwrap();

    assert_eq!(
        partition.entry_id(&dn("ou=Engineering,ou=Sales,o=Root")).unwrap(),
        Some(eng)
    );
    assert_eq!(
        partition
            .entry_id(&dn("cn=kim,ou=Engineering,ou=Sales,o=Root"))
            .unwrap(),
        Some(kim)
    );
    assert_eq!(
        partition.entry_updn(kim).unwrap(),
        Some("cn=kim,ou=Engineering,ou=Sales,o=Root")
    );
}

#[test]
fn modify_round_trips_through_the_facade() {
    let mut partition = partition();
    let id = partition
        .add(
            Entry::new(dn("cn=kim,o=Root"))
                .with("objectClass", ["person"])
                .with("cn", ["kim"]),
        )
        .unwrap();

    partition
        .modify(
            &dn("cn=kim,o=Root"),
            &Modification::new(ModOp::Add, Attribute::with_values("ou", ["Sales"])),
        )
        .unwrap();
    assert!(partition.lookup(id).unwrap().unwrap().has_value("ou", "Sales"));

    partition
        .modify(
            &dn("cn=kim,o=Root"),
            &Modification::new(ModOp::Remove, Attribute::new("ou")),
        )
        .unwrap();
    assert!(!partition.lookup(id).unwrap().unwrap().has("ou"));
}

#[test]
fn delete_returns_the_removed_entry() {
    let mut partition = partition();
    let id = partition
        .add(unit("ou=Sales,o=Root").with("ou", ["Sales"]))
        .unwrap();

    let removed = partition.delete(id).unwrap();
    assert_eq!(removed.dn().user(), "ou=Sales,o=Root");
    assert_eq!(partition.entry_id(&dn("ou=Sales,o=Root")).unwrap(), None);
    assert_eq!(partition.count().unwrap(), 1);
}
