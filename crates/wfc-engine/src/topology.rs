use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;
use wfc_core::errors::{ErrorInfo, WfcError};
use wfc_core::rng::{wall_clock_seed, RngHandle};
use wfc_core::{NodeId, State};

use crate::compat::Compatibility;
use crate::ids::{make_node, node_index};
use crate::node::Node;

/// Constraint graph owning the cells, the sampling weights, and the
/// compatibility strategy.
///
/// Nodes live in a single arena and refer to each other by [`NodeId`]
/// index, so a clone is self-contained with no reference rebinding. A
/// failed collapse leaves the topology in an unspecified intermediate
/// state; callers wanting retry semantics clone first and collapse the
/// clone.
#[derive(Debug, Clone)]
pub struct Topology<S> {
    /// Arena of cells; adjacency slots refer into it by index.
    pub nodes: Vec<Node<S>>,
    /// Sampling weight per state. Missing entries weigh 1; a zero weight
    /// excludes the state from sampling without removing the candidate.
    pub weights: BTreeMap<S, f64>,
    /// Symmetric compatibility strategy consulted across every edge.
    pub compatible: Compatibility<S>,
}

impl<S: State> Topology<S> {
    /// Creates an empty topology with no constraints.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            weights: BTreeMap::new(),
            compatible: Compatibility::Free,
        }
    }

    /// Appends a node with the given candidates and returns its id.
    pub fn add_node(&mut self, states: Vec<S>) -> NodeId {
        let id = make_node(self.nodes.len());
        self.nodes.push(Node::new(states));
        id
    }

    /// Returns the node behind `id`.
    pub fn node(&self, id: NodeId) -> Result<&Node<S>, WfcError> {
        self.nodes
            .get(node_index(id))
            .ok_or_else(|| unknown_node(id))
    }

    /// Returns the node behind `id` mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<S>, WfcError> {
        self.nodes
            .get_mut(node_index(id))
            .ok_or_else(|| unknown_node(id))
    }

    /// Collapses the whole topology with a wall-clock seed.
    ///
    /// Not reproducible; tests and retry loops use [`collapse_seeded`]
    /// instead.
    ///
    /// [`collapse_seeded`]: Topology::collapse_seeded
    pub fn collapse(&mut self) -> Result<(), WfcError> {
        self.collapse_seeded(wall_clock_seed())
    }

    /// Collapses the whole topology deterministically from `seed`.
    ///
    /// Repeatedly forces the least entropic cell to a sampled state and
    /// propagates the implications until every cell is singleton. Each
    /// round strictly decreases the total candidate count, so the loop
    /// terminates. Fails with a no-valid-states error when a cell runs
    /// out of candidates, with the topology left partially reduced.
    pub fn collapse_seeded(&mut self, seed: u64) -> Result<(), WfcError> {
        let mut rng = RngHandle::from_seed(seed);
        while !self.is_collapsed() {
            let Some(id) = self.min_entropy_node(&mut rng) else {
                return Err(WfcError::NoValidStates(ErrorInfo::new(
                    "empty-candidates",
                    "an unsettled cell has no candidates left",
                )));
            };
            let state = self.sample_state(id, &mut rng)?;
            self.collapse_node(id, &state)?;
        }
        Ok(())
    }

    /// Forces a node to a specific state and propagates the implications.
    ///
    /// Fails with an invalid-forced-state error, touching nothing, when
    /// `state` is not in the node's current candidate set.
    pub fn collapse_node(&mut self, id: NodeId, state: &S) -> Result<(), WfcError> {
        let node = self.node(id)?;
        if !node.states.contains(state) {
            return Err(WfcError::InvalidState(
                ErrorInfo::new(
                    "state-not-candidate",
                    "state is not in the node's candidate set",
                )
                .with_context("node", id.as_raw()),
            ));
        }
        self.nodes[node_index(id)].states = vec![state.clone()];
        self.propagate(id)
    }

    /// Whether every cell has been forced to a single state.
    ///
    /// Does not re-check compatibility; see [`is_correct`].
    ///
    /// [`is_correct`]: Topology::is_correct
    pub fn is_collapsed(&self) -> bool {
        self.nodes.iter().all(Node::is_settled)
    }

    /// Whether every cell is singleton and every present neighbor pair is
    /// compatible.
    pub fn is_correct(&self) -> bool {
        self.nodes.iter().enumerate().all(|(index, a)| {
            a.is_settled()
                && a.adjacent.iter().all(|slot| {
                    let Some(b_id) = slot else { return true };
                    let Some(b) = self.nodes.get(node_index(*b_id)) else {
                        return false;
                    };
                    b.is_settled()
                        && self.compatible.matches(
                            a,
                            make_node(index),
                            &a.states[0],
                            b,
                            *b_id,
                            &b.states[0],
                        )
                })
        })
    }

    /// Picks the uncollapsed node with the fewest candidates.
    ///
    /// Ties are broken uniformly among the current minima with exactly one
    /// integer draw. Returns `None` when no node has two or more
    /// candidates; the collapse loop only reaches that case through an
    /// emptied cell, since it re-checks `is_collapsed` every round.
    fn min_entropy_node(&self, rng: &mut RngHandle) -> Option<NodeId> {
        let mut min_entropy: Option<usize> = None;
        for node in &self.nodes {
            let entropy = node.entropy();
            if entropy >= 2 && min_entropy.map_or(true, |current| entropy < current) {
                min_entropy = Some(entropy);
            }
        }
        let min_entropy = min_entropy?;

        let candidates: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.entropy() == min_entropy)
            .map(|(index, _)| make_node(index))
            .collect();
        let pick = (rng.next_u64() % candidates.len() as u64) as usize;
        Some(candidates[pick])
    }

    /// Draws a state for the node from its weighted candidates.
    ///
    /// Candidates keep their in-node order; entries with non-positive
    /// weight or that would immediately contradict a neighbor are
    /// filtered out before the draw. The placeability filter matters for
    /// hand-built nodes whose listed candidates were never reduced.
    fn sample_state(&self, id: NodeId, rng: &mut RngHandle) -> Result<S, WfcError> {
        let node = &self.nodes[node_index(id)];
        let mut states = Vec::new();
        let mut weights = Vec::new();
        for state in &node.states {
            let weight = self.weights.get(state).copied().unwrap_or(1.0);
            if weight > 0.0 && self.is_placeable(id, state) {
                states.push(state.clone());
                weights.push(weight);
            }
        }
        if states.is_empty() {
            return Err(WfcError::NoValidStates(
                ErrorInfo::new(
                    "no-placeable-state",
                    "no candidate has positive weight and fits all neighbors",
                )
                .with_context("node", id.as_raw()),
            ));
        }
        let distribution = WeightedIndex::new(&weights).map_err(|err| {
            WfcError::NoValidStates(
                ErrorInfo::new("weight-distribution", err.to_string())
                    .with_context("node", id.as_raw()),
            )
        })?;
        Ok(states[distribution.sample(rng)].clone())
    }

    /// Breadth-first constraint propagation from a freshly forced node.
    ///
    /// Neighbors are scanned in slot order; a node is enqueued at most
    /// once per call and only when its candidate set strictly shrank.
    fn propagate(&mut self, start: NodeId) -> Result<(), WfcError> {
        let mut queue = VecDeque::new();
        let mut visited = BTreeSet::new();
        queue.push_back(start);
        visited.insert(start);

        while let Some(current) = queue.pop_front() {
            let neighbors: Vec<NodeId> = self.nodes[node_index(current)]
                .adjacent
                .iter()
                .flatten()
                .copied()
                .collect();
            for neighbor in neighbors {
                if visited.contains(&neighbor) {
                    continue;
                }
                if self.reduce_states(neighbor)? {
                    queue.push_back(neighbor);
                    visited.insert(neighbor);
                }
            }
        }
        Ok(())
    }

    /// Stable-filters the node's candidates down to the placeable ones.
    ///
    /// The filtered set is stored before the emptiness check, matching the
    /// unspecified-on-failure contract. Returns whether the set shrank.
    fn reduce_states(&mut self, id: NodeId) -> Result<bool, WfcError> {
        let states = self.nodes[node_index(id)].states.clone();
        let mut kept = Vec::with_capacity(states.len());
        for state in &states {
            if self.is_placeable(id, state) {
                kept.push(state.clone());
            }
        }
        let changed = kept.len() != states.len();
        let emptied = kept.is_empty();
        self.nodes[node_index(id)].states = kept;
        if emptied {
            return Err(WfcError::NoValidStates(
                ErrorInfo::new("empty-candidates", "propagation removed every candidate")
                    .with_context("node", id.as_raw()),
            ));
        }
        Ok(changed)
    }

    /// Whether `state` fits on the node given every present neighbor.
    ///
    /// Universal over neighbors, existential over the neighbor's
    /// candidates: one neighbor with no compatible candidate eliminates
    /// the state.
    fn is_placeable(&self, id: NodeId, state: &S) -> bool {
        let node = &self.nodes[node_index(id)];
        node.adjacent.iter().all(|slot| {
            let Some(neighbor_id) = slot else { return true };
            let Some(neighbor) = self.nodes.get(node_index(*neighbor_id)) else {
                return false;
            };
            neighbor.states.iter().any(|neighbor_state| {
                self.compatible
                    .matches(node, id, state, neighbor, *neighbor_id, neighbor_state)
            })
        })
    }
}

impl<S> Default for Topology<S> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            weights: BTreeMap::new(),
            compatible: Compatibility::Free,
        }
    }
}

fn unknown_node(id: NodeId) -> WfcError {
    WfcError::Structure(
        ErrorInfo::new("unknown-node", "node does not exist").with_context("node", id.as_raw()),
    )
}
