use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use wfc_core::errors::{ErrorInfo, WfcError};
use wfc_core::{NodeId, State};
use wfc_engine::{
    AllowedNeighbors, AxisRule, AxisRules, Compatibility, EdgeTokens, Node, Topology,
};

use crate::coords::{coord_of, index_of};

/// A topology whose cells form a D-dimensional grid.
///
/// Wraps the engine's [`Topology`] (reachable through `Deref`) together
/// with the grid extents and per-axis periodicity, and offers
/// coordinate-indexed access on top of the arena.
#[derive(Debug, Clone)]
pub struct CartesianTopology<S, const D: usize> {
    topology: Topology<S>,
    size: [usize; D],
    periodic: [bool; D],
}

impl<S: State, const D: usize> CartesianTopology<S, D> {
    /// Builds a grid where every pair of states is compatible.
    pub fn unconstrained(
        size: [usize; D],
        periodic: [bool; D],
        states: Vec<S>,
        weights: BTreeMap<S, f64>,
    ) -> Result<Self, WfcError> {
        Self::build(size, periodic, states, weights)
    }

    /// Builds a grid constrained by allowed-neighbor sets.
    ///
    /// `allowed` lists, per state and per direction slot, the states that
    /// may occupy the neighboring cell; the candidate alphabet is the
    /// table's key set in its deterministic order. Both facing directions
    /// must agree for a pair to be compatible.
    pub fn with_allowed_neighbors(
        size: [usize; D],
        periodic: [bool; D],
        allowed: BTreeMap<S, Vec<Vec<S>>>,
        weights: BTreeMap<S, f64>,
    ) -> Result<Self, WfcError> {
        let states: Vec<S> = allowed.keys().cloned().collect();
        let table = AllowedNeighbors::new(2 * D, allowed)?;
        let mut grid = Self::build(size, periodic, states, weights)?;
        grid.topology.compatible = Compatibility::Adjacent(table);
        Ok(grid)
    }

    /// Builds a grid constrained by one binary rule per axis.
    ///
    /// Each rule is stated in the canonical negative-to-positive
    /// orientation of its axis, regardless of which endpoint a query
    /// starts from.
    pub fn with_axis_rules(
        size: [usize; D],
        periodic: [bool; D],
        states: Vec<S>,
        rules: [AxisRule<S>; D],
        weights: BTreeMap<S, f64>,
    ) -> Result<Self, WfcError> {
        let mut grid = Self::build(size, periodic, states, weights)?;
        grid.topology.compatible = Compatibility::AxisRules(AxisRules::new(rules.to_vec()));
        Ok(grid)
    }

    /// Builds a grid constrained by edge-token matching.
    ///
    /// `tokens` lists, per state and per direction slot, the tokens
    /// carried by that edge; two facing edges are compatible when their
    /// token sets intersect. Token values are interned, so any ordered
    /// type works.
    pub fn with_edge_tokens<T: Ord + Clone>(
        size: [usize; D],
        periodic: [bool; D],
        tokens: BTreeMap<S, Vec<Vec<T>>>,
        weights: BTreeMap<S, f64>,
    ) -> Result<Self, WfcError> {
        let states: Vec<S> = tokens.keys().cloned().collect();
        let table = EdgeTokens::intern(2 * D, tokens)?;
        let mut grid = Self::build(size, periodic, states, weights)?;
        grid.topology.compatible = Compatibility::Tokens(table);
        Ok(grid)
    }

    /// Grid extents per axis.
    pub fn size(&self) -> [usize; D] {
        self.size
    }

    /// Per-axis periodicity flags.
    pub fn periodic(&self) -> [bool; D] {
        self.periodic
    }

    /// Arena index of `coord`; meaningful only for in-range coordinates.
    pub fn index_of(&self, coord: [usize; D]) -> usize {
        index_of(coord, self.size)
    }

    /// Coordinate of the arena index `index`.
    pub fn coord_of(&self, index: usize) -> [usize; D] {
        coord_of(index, self.size)
    }

    /// Identifier of the cell at `coord`.
    pub fn node_id(&self, coord: [usize; D]) -> Result<NodeId, WfcError> {
        self.check_coord(coord)?;
        Ok(NodeId::from_raw(index_of(coord, self.size) as u64))
    }

    /// The cell at `coord`.
    pub fn node(&self, coord: [usize; D]) -> Result<&Node<S>, WfcError> {
        self.check_coord(coord)?;
        Ok(&self.topology.nodes[index_of(coord, self.size)])
    }

    /// The cell at `coord`, mutably.
    pub fn node_mut(&mut self, coord: [usize; D]) -> Result<&mut Node<S>, WfcError> {
        self.check_coord(coord)?;
        Ok(&mut self.topology.nodes[index_of(coord, self.size)])
    }

    /// Consumes the grid, returning the underlying topology.
    pub fn into_topology(self) -> Topology<S> {
        self.topology
    }

    fn check_coord(&self, coord: [usize; D]) -> Result<(), WfcError> {
        for axis in 0..D {
            if coord[axis] >= self.size[axis] {
                return Err(WfcError::Structure(
                    ErrorInfo::new("coord-out-of-bounds", "coordinate lies outside the grid")
                        .with_context("axis", axis)
                        .with_context("coord", coord[axis])
                        .with_context("extent", self.size[axis]),
                ));
            }
        }
        Ok(())
    }

    fn build(
        size: [usize; D],
        periodic: [bool; D],
        states: Vec<S>,
        weights: BTreeMap<S, f64>,
    ) -> Result<Self, WfcError> {
        if D == 0 {
            return Err(WfcError::Structure(ErrorInfo::new(
                "zero-dimension",
                "a grid needs at least one axis",
            )));
        }
        for (axis, &extent) in size.iter().enumerate() {
            if extent == 0 {
                return Err(WfcError::Structure(
                    ErrorInfo::new("empty-axis", "every axis needs a non-zero extent")
                        .with_context("axis", axis),
                ));
            }
        }
        if states.is_empty() {
            return Err(WfcError::Structure(ErrorInfo::new(
                "empty-alphabet",
                "the candidate alphabet is empty",
            )));
        }

        let total: usize = size.iter().product();
        let mut topology = Topology::new();
        topology.weights = weights;

        for index in 0..total {
            let coord = coord_of(index, size);
            topology.add_node(states.clone());

            let mut adjacent = vec![None; 2 * D];
            for axis in 0..D {
                let extent = size[axis];
                let mut negative = coord;
                negative[axis] = if coord[axis] == 0 {
                    extent - 1
                } else {
                    coord[axis] - 1
                };
                let mut positive = coord;
                positive[axis] = if coord[axis] + 1 == extent {
                    0
                } else {
                    coord[axis] + 1
                };
                if coord[axis] != 0 || periodic[axis] {
                    adjacent[2 * axis] = Some(NodeId::from_raw(index_of(negative, size) as u64));
                }
                if coord[axis] + 1 != extent || periodic[axis] {
                    adjacent[2 * axis + 1] =
                        Some(NodeId::from_raw(index_of(positive, size) as u64));
                }
            }
            topology.nodes[index].adjacent = adjacent;
        }

        Ok(Self {
            topology,
            size,
            periodic,
        })
    }
}

impl<S, const D: usize> Deref for CartesianTopology<S, D> {
    type Target = Topology<S>;

    fn deref(&self) -> &Self::Target {
        &self.topology
    }
}

impl<S, const D: usize> DerefMut for CartesianTopology<S, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.topology
    }
}
