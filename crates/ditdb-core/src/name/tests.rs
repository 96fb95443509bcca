use super::*;

#[test]
fn parses_leaf_first_and_stores_root_first() {
    let dn = Dn::parse("ou=Sales,o=Root").unwrap();

    assert_eq!(dn.len(), 2);
    assert_eq!(dn.rdns()[0].user(), "o=Root");
    assert_eq!(dn.rdn().unwrap().user(), "ou=Sales");
}

#[test]
fn normalization_lowercases_and_trims() {
    let dn = Dn::parse("OU= Sales , O=Root").unwrap();

    assert_eq!(dn.normalized(), "ou=sales,o=root");
    assert_eq!(dn.user(), "OU=Sales,O=Root");
}

#[test]
fn both_forms_agree_on_component_count() {
    let dn = Dn::parse("cn=a+sn=b,ou=x,o=Root").unwrap();

    let norm_components = dn.normalized().split(',').count();
    let user_components = dn.user().split(',').count();
    assert_eq!(norm_components, user_components);
    assert_eq!(norm_components, dn.len());
}

#[test]
fn multi_valued_rdn_normalizes_in_sorted_order() {
    let a = Rdn::parse("sn=B+cn=A").unwrap();
    let b = Rdn::parse("cn=a+sn=b").unwrap();

    assert_eq!(a.normalized(), "cn=a+sn=b");
    assert!(a.matches(&b));
}

#[test]
fn escaped_separators_stay_in_the_value() {
    let dn = Dn::parse(r"cn=Smith\, John,o=Root").unwrap();

    assert_eq!(dn.len(), 2);
    assert_eq!(dn.rdn().unwrap().avas()[0].value(), "Smith, John");
}

#[test]
fn parent_and_child_round_trip() {
    let dn = Dn::parse("ou=Sales,o=Root").unwrap();

    let parent = dn.parent().unwrap();
    assert_eq!(parent.normalized(), "o=root");
    assert!(parent.parent().unwrap().is_root());

    let child = parent.child(Rdn::single("ou", "Sales"));
    assert_eq!(child, dn);
}

#[test]
fn with_rdn_replaces_the_leaf() {
    let dn = Dn::parse("ou=Sales,o=Root").unwrap();
    let renamed = dn.with_rdn(Rdn::single("ou", "Marketing"));

    assert_eq!(renamed.normalized(), "ou=marketing,o=root");
}

#[test]
fn ancestry_predicates() {
    let suffix = Dn::parse("o=Root").unwrap();
    let sales = Dn::parse("ou=Sales,o=Root").unwrap();
    let deep = Dn::parse("cn=x,ou=Sales,o=Root").unwrap();
    let other = Dn::parse("o=Elsewhere").unwrap();

    assert!(deep.is_under(&suffix));
    assert!(deep.is_under(&sales));
    assert!(deep.is_at_or_under(&deep));
    assert!(!deep.is_under(&deep));
    assert!(!sales.is_under(&deep));
    assert!(!other.is_at_or_under(&suffix));
}

#[test]
fn dn_equality_is_normalized() {
    let a = Dn::parse("OU=Sales, O=Root").unwrap();
    let b = Dn::parse("ou=sales,o=root").unwrap();

    assert_eq!(a, b);
}

#[test]
fn parse_errors() {
    assert!(matches!(
        Dn::parse("ou=Sales,"),
        Err(DnParseError::EmptyComponent { .. })
    ));
    assert!(matches!(
        Dn::parse("nosign,o=Root"),
        Err(DnParseError::MissingSeparator { .. })
    ));
    assert!(matches!(
        Dn::parse("=value,o=Root"),
        Err(DnParseError::EmptyType { .. })
    ));
    assert!(matches!(
        Dn::parse(r"cn=trailing\"),
        Err(DnParseError::TrailingEscape { .. })
    ));
}
