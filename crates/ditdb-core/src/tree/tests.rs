use super::*;

fn seeded() -> TupleTree<u64, u64> {
    let mut tree = TupleTree::with_duplicates();
    tree.put(1, 10);
    tree.put(1, 11);
    tree.put(2, 20);
    tree.put(4, 40);
    tree.put(4, 41);
    tree.put(4, 42);

    tree
}

#[test]
fn put_is_idempotent_per_tuple() {
    let mut tree = seeded();
    let before = tree.len();

    assert!(!tree.put(1, 10));
    assert_eq!(tree.len(), before);
}

#[test]
fn single_value_mode_replaces() {
    let mut tree = TupleTree::new();
    assert!(tree.put("a", 1));
    assert!(tree.put("a", 2));
    assert!(!tree.put("a", 2));

    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(&"a"), Some(&2));
}

#[test]
fn get_returns_minimum_value_under_duplicates() {
    let tree = seeded();
    assert_eq!(tree.get(&4), Some(&40));
    assert_eq!(tree.get(&3), None);
}

#[test]
fn remove_tuple_and_key() {
    let mut tree = seeded();

    assert!(tree.remove(&4, &41));
    assert!(!tree.remove(&4, &41));
    assert_eq!(tree.count_for_key(&4), 2);

    assert_eq!(tree.remove_key(&1), 2);
    assert!(!tree.contains_key(&1));
    assert_eq!(tree.len(), 3);
}

#[test]
fn range_positioning() {
    let tree = seeded();

    assert_eq!(tree.first_at_or_after(&3), Some((&4, &40)));
    assert_eq!(tree.last_at_or_before(&3), Some((&2, &20)));
    assert_eq!(tree.first_at_or_after(&5), None);
    assert_eq!(tree.last_at_or_before(&0), None);
}

#[test]
fn cursor_walks_tuples_in_order() {
    let tree = seeded();
    let mut cursor = tree.cursor();

    let mut seen = Vec::new();
    while let Some(tuple) = cursor.next() {
        seen.push(tuple);
    }

    assert_eq!(seen, vec![(1, 10), (1, 11), (2, 20), (4, 40), (4, 41), (4, 42)]);
    assert_eq!(cursor.next(), None);
}

#[test]
fn cursor_walks_backward_from_the_end() {
    let tree = seeded();
    let mut cursor = tree.cursor();
    cursor.after_last();

    assert_eq!(cursor.prev(), Some((4, 42)));
    assert_eq!(cursor.prev(), Some((4, 41)));

    // Direction reversal resumes from the current tuple.
    assert_eq!(cursor.next(), Some((4, 42)));
}

#[test]
fn cursor_is_restartable() {
    let tree = seeded();
    let mut cursor = tree.cursor();

    assert_eq!(cursor.next(), Some((1, 10)));
    cursor.before_first();
    assert_eq!(cursor.next(), Some((1, 10)));
}

#[test]
fn cursor_seats_before_a_key() {
    let tree = seeded();

    let mut cursor = tree.cursor_at(&2);
    assert_eq!(cursor.next(), Some((2, 20)));

    // A probe between keys lands on the next greater key.
    cursor.before_key(&3);
    assert_eq!(cursor.next(), Some((4, 40)));

    // A probe past the end walks off immediately.
    cursor.before_key(&9);
    assert_eq!(cursor.next(), None);
}

#[test]
fn prev_before_the_first_tuple_is_none() {
    let tree = seeded();
    let mut cursor = tree.cursor();

    assert_eq!(cursor.prev(), None);
    // And the position stays restartable.
    assert_eq!(cursor.next(), Some((1, 10)));
}
