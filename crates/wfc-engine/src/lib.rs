#![deny(missing_docs)]

//! Deterministic wave-function-collapse engine over an arbitrary graph of
//! cells.
//!
//! A [`Topology`] owns an arena of [`Node`]s, a weight table biasing random
//! state selection, and a [`Compatibility`] strategy deciding which state
//! pairs may sit on adjacent cells. Collapsing repeatedly forces the least
//! entropic cell to a sampled state and propagates the implications
//! breadth-first until every cell is singleton or a cell runs out of
//! candidates.

mod compat;
mod fingerprint;
mod ids;
mod node;
mod topology;

pub use compat::{
    shared_direction, AllowedNeighbors, AxisRule, AxisRules, Compatibility, CompatibilityFn,
    EdgeTokens, TokenId,
};
pub use fingerprint::canonical_hash;
pub use node::Node;
pub use topology::Topology;
