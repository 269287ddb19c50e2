use wfc_core::NodeId;
use wfc_engine::{Compatibility, Topology};

#[test]
fn zero_weight_is_never_sampled_and_bias_holds() {
    let mut base = Topology::new();
    base.add_node(vec!['A', 'B', 'C']);
    base.weights.insert('A', 0.0);
    base.weights.insert('B', 2.0);
    base.weights.insert('C', 1.0);

    let mut picked_b = 0usize;
    let mut picked_c = 0usize;
    for seed in 0..2000u64 {
        let mut run = base.clone();
        run.collapse_seeded(seed).expect("collapse");
        match run.nodes[0].states[0] {
            'A' => panic!("zero-weight state sampled at seed {seed}"),
            'B' => picked_b += 1,
            'C' => picked_c += 1,
            other => panic!("unexpected state {other}"),
        }
    }

    let ratio = picked_b as f64 / picked_c as f64;
    assert!(
        (1.7..=2.3).contains(&ratio),
        "B:C ratio {ratio} strayed from 2:1 ({picked_b}:{picked_c})"
    );
}

#[test]
fn unplaceable_candidates_are_never_sampled() {
    let mut base = Topology::new();
    let fixed = base.add_node(vec!['A']);
    let open = base.add_node(vec!['B', 'A']);
    base.nodes[0].adjacent = vec![Some(open)];
    base.nodes[1].adjacent = vec![Some(fixed)];
    base.compatible = Compatibility::predicate(|_, sa, _, sb| sa == sb);

    for seed in 0..50u64 {
        let mut run = base.clone();
        run.collapse_seeded(seed).expect("collapse");
        assert_eq!(run.node(NodeId::from_raw(1)).expect("node").states, vec!['A']);
        assert!(run.is_correct());
    }
}

#[test]
fn missing_weight_defaults_to_one() {
    let mut base = Topology::new();
    base.add_node(vec!['A', 'B']);
    base.weights.insert('A', 1.0);

    let mut seen_b = false;
    for seed in 0..100u64 {
        let mut run = base.clone();
        run.collapse_seeded(seed).expect("collapse");
        if run.nodes[0].states[0] == 'B' {
            seen_b = true;
            break;
        }
    }
    assert!(seen_b, "default-weight state was never sampled");
}
