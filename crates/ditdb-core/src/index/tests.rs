use super::*;

fn id(raw: u64) -> EntryId {
    EntryId::new(raw)
}

#[test]
fn forward_and_reverse_stay_in_lockstep() {
    let mut index: Index<String> = Index::new(Oid::new("2.5.4.3"));
    index.add("alpha".into(), id(2));
    index.add("alpha".into(), id(3));
    index.add("beta".into(), id(2));

    assert_eq!(index.forward_lookup(&"alpha".into()), Some(id(2)));
    assert_eq!(index.count_for_key(&"alpha".into()), 2);

    // Single-valued reverse: the later key replaced the earlier one.
    assert_eq!(index.reverse_lookup(id(2)), Some(&"beta".to_string()));

    index.drop(&"alpha".into(), id(3));
    assert!(!index.contains(&"alpha".into(), id(3)));
    assert_eq!(index.count(), 2);
}

#[test]
fn adding_the_same_tuple_twice_keeps_counts() {
    let mut index: Index<String> = Index::new(Oid::new("2.5.4.3"));
    index.add("alpha".into(), id(2));
    index.add("alpha".into(), id(2));

    assert_eq!(index.count_for_key(&"alpha".into()), 1);
    assert_eq!(index.count(), 1);
}

#[test]
fn hierarchical_reverse_fans_out() {
    let mut index: Index<EntryId> = Index::hierarchical(Oid::new("1.1"));
    index.add(id(1), id(5));
    index.add(id(2), id(5));
    index.add(id(3), id(5));

    let ancestors: Vec<EntryId> = index.reverse_values(id(5)).copied().collect();
    assert_eq!(ancestors, vec![id(1), id(2), id(3)]);
}

#[test]
fn drop_id_clears_every_tuple_for_that_id_only() {
    let mut index: Index<EntryId> = Index::hierarchical(Oid::new("1.1"));
    index.add(id(1), id(5));
    index.add(id(2), id(5));
    index.add(id(1), id(6));

    index.drop_id(id(5));

    assert!(!index.contains_id(id(5)));
    assert!(index.contains(&id(1), id(6)));
    assert_eq!(index.count(), 1);
}
