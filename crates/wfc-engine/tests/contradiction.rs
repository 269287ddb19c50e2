use wfc_core::{NodeId, WfcError};
use wfc_engine::{Compatibility, Topology};

/// Two mutually adjacent cells whose states must be equal.
fn equal_pair() -> Topology<char> {
    let mut topology = Topology::new();
    let a = topology.add_node(vec!['A', 'B']);
    let b = topology.add_node(vec!['A', 'B']);
    topology.nodes[0].adjacent = vec![Some(b)];
    topology.nodes[1].adjacent = vec![Some(a)];
    topology.compatible = Compatibility::predicate(|_, sa, _, sb| sa == sb);
    topology
}

#[test]
fn conflicting_forces_surface_no_valid_states() {
    let mut topology = equal_pair();
    let b = NodeId::from_raw(1);

    topology.nodes[0].states = vec!['A'];
    let err = topology.collapse_node(b, &'B').unwrap_err();

    match err {
        WfcError::NoValidStates(info) => {
            assert_eq!(info.code, "empty-candidates");
            assert_eq!(info.context.get("node"), Some(&"0".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_force_is_rejected_without_mutation() {
    let mut topology = equal_pair();
    let a = NodeId::from_raw(0);

    let err = topology.collapse_node(a, &'C').unwrap_err();

    match err {
        WfcError::InvalidState(info) => {
            assert_eq!(info.code, "state-not-candidate");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(topology.nodes[0].states, vec!['A', 'B']);
    assert_eq!(topology.nodes[1].states, vec!['A', 'B']);
}

#[test]
fn unknown_node_is_a_structure_error() {
    let mut topology = equal_pair();

    let err = topology.collapse_node(NodeId::from_raw(9), &'A').unwrap_err();

    match err {
        WfcError::Structure(info) => assert_eq!(info.code, "unknown-node"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn propagation_reduces_the_partner_cell() {
    let mut topology = equal_pair();
    let a = NodeId::from_raw(0);

    topology.collapse_node(a, &'A').expect("force");

    assert_eq!(topology.nodes[1].states, vec!['A']);
    assert!(topology.is_collapsed());
    assert!(topology.is_correct());
}
