#![deny(missing_docs)]

//! Shared contracts for the wave-function-collapse workspace: node
//! identifiers, the state bound, the structured error surface, and the
//! deterministic RNG seam.

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod rng;

pub use errors::{ErrorInfo, WfcError};
pub use rng::{derive_substream_seed, wall_clock_seed, RngHandle};

/// Identifier for a node within a topology arena.
///
/// The identifier is the node's position in the owning arena. Nodes are
/// never removed, so an identifier stays valid for the lifetime of the
/// topology that issued it, and it survives cloning the topology because
/// adjacency is stored as identifiers rather than references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Bound required of cell states.
///
/// States are compared by value and key deterministic `BTreeMap` tables
/// (weights, allowed-neighbor sets), hence the total order requirement.
pub trait State: Clone + Eq + Ord + std::fmt::Debug {}

impl<T> State for T where T: Clone + Eq + Ord + std::fmt::Debug {}
