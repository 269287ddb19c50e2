#![deny(missing_docs)]

//! Cartesian grid builder for wave-function-collapse topologies.
//!
//! A [`CartesianTopology`] lays `Π size[a]` cells out in column-major
//! order and wires `2·D` directional adjacency slots per cell: slot `2a`
//! is the negative direction along axis `a`, slot `2a + 1` the positive
//! one, and the opposite of slot `i` is `i ^ 1`. Axes wrap when marked
//! periodic and leave absent boundary slots otherwise. Four constructors
//! cover the compatibility flavors: unconstrained, allowed-neighbor sets,
//! per-axis binary rules, and edge-token matching.

mod cartesian;
mod coords;

pub use cartesian::CartesianTopology;
pub use coords::{coord_of, index_of};
