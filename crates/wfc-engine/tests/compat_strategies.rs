use std::collections::BTreeMap;
use std::sync::Arc;

use wfc_core::{NodeId, WfcError};
use wfc_engine::{
    shared_direction, AllowedNeighbors, AxisRule, AxisRules, Compatibility, EdgeTokens, Node,
};

/// Two cells on one axis: `a` sees `b` through its positive slot.
fn pair(a_state: char, b_state: char) -> (Node<char>, Node<char>) {
    let mut a = Node::new(vec![a_state]);
    let mut b = Node::new(vec![b_state]);
    a.adjacent = vec![None, Some(NodeId::from_raw(1))];
    b.adjacent = vec![Some(NodeId::from_raw(0)), None];
    (a, b)
}

#[test]
fn shared_direction_follows_slot_parity() {
    let (a, b) = pair('X', 'Y');
    assert_eq!(
        shared_direction(&a, NodeId::from_raw(0), &b, NodeId::from_raw(1)),
        Some(1)
    );
    assert_eq!(
        shared_direction(&b, NodeId::from_raw(1), &a, NodeId::from_raw(0)),
        Some(0)
    );
}

#[test]
fn shared_direction_requires_mutual_slots() {
    let (a, mut b) = pair('X', 'Y');
    b.adjacent = vec![None, None];
    assert_eq!(
        shared_direction(&a, NodeId::from_raw(0), &b, NodeId::from_raw(1)),
        None
    );
}

#[test]
fn non_adjacent_pairs_are_incompatible_under_table_modes() {
    let mut table = BTreeMap::new();
    table.insert('X', vec![vec!['Y']; 2]);
    table.insert('Y', vec![vec!['X']; 2]);
    let compatibility =
        Compatibility::Adjacent(AllowedNeighbors::new(2, table).expect("table"));

    let (a, _) = pair('X', 'Y');
    let stranger = Node::new(vec!['Y']);
    assert!(!compatibility.matches(
        &a,
        NodeId::from_raw(0),
        &'X',
        &stranger,
        NodeId::from_raw(7),
        &'Y'
    ));
}

#[test]
fn allowed_neighbors_require_agreement_both_ways() {
    let mut mutual = BTreeMap::new();
    mutual.insert('X', vec![vec!['Y']; 2]);
    mutual.insert('Y', vec![vec!['X']; 2]);
    let agreeing = Compatibility::Adjacent(AllowedNeighbors::new(2, mutual).expect("table"));

    let mut one_sided = BTreeMap::new();
    one_sided.insert('X', vec![vec!['Y']; 2]);
    one_sided.insert('Y', vec![vec![]; 2]);
    let refusing = Compatibility::Adjacent(AllowedNeighbors::new(2, one_sided).expect("table"));

    let (a, b) = pair('X', 'Y');
    assert!(agreeing.matches(&a, NodeId::from_raw(0), &'X', &b, NodeId::from_raw(1), &'Y'));
    assert!(!refusing.matches(&a, NodeId::from_raw(0), &'X', &b, NodeId::from_raw(1), &'Y'));
}

#[test]
fn axis_rules_read_negative_to_positive_from_either_endpoint() {
    let ascending: AxisRule<char> = Arc::new(|left, right| left < right);
    let rules = AxisRules::new(vec![ascending]);
    assert_eq!(rules.axes(), 1);

    // Positive slot: own state is the negative endpoint.
    assert!(rules.holds(1, &'a', &'b'));
    assert!(!rules.holds(1, &'b', &'a'));
    // Negative slot: the neighbor is the negative endpoint.
    assert!(rules.holds(0, &'b', &'a'));
    assert!(!rules.holds(0, &'a', &'b'));

    let compatibility = Compatibility::AxisRules(rules);
    let (a, b) = pair('a', 'b');
    let forward =
        compatibility.matches(&a, NodeId::from_raw(0), &'a', &b, NodeId::from_raw(1), &'b');
    let backward =
        compatibility.matches(&b, NodeId::from_raw(1), &'b', &a, NodeId::from_raw(0), &'a');
    assert!(forward && backward);
}

#[test]
fn edge_tokens_match_on_any_shared_element() {
    let mut raw = BTreeMap::new();
    raw.insert('X', vec![vec![], vec![1u8, 2]]);
    raw.insert('Y', vec![vec![2u8, 3], vec![]]);
    raw.insert('Z', vec![vec![4u8], vec![]]);
    let tokens = EdgeTokens::intern(2, raw).expect("intern");

    assert!(tokens.share_token(&'X', 1, &'Y'));
    assert!(!tokens.share_token(&'X', 1, &'Z'));

    let compatibility = Compatibility::Tokens(tokens);
    let (a, b) = pair('X', 'Y');
    assert!(compatibility.matches(&a, NodeId::from_raw(0), &'X', &b, NodeId::from_raw(1), &'Y'));
}

#[test]
fn wrong_direction_arity_is_rejected() {
    let mut table = BTreeMap::new();
    table.insert('X', vec![vec!['X']]);
    let err = AllowedNeighbors::new(2, table).unwrap_err();
    match err {
        WfcError::Structure(info) => {
            assert_eq!(info.code, "direction-arity");
            assert_eq!(info.context.get("found"), Some(&"1".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn free_compatibility_accepts_everything() {
    let (a, b) = pair('X', 'Y');
    let free = Compatibility::<char>::Free;
    assert!(free.matches(&a, NodeId::from_raw(0), &'X', &b, NodeId::from_raw(1), &'Y'));
}
