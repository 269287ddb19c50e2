use sha2::{Digest, Sha256};
use wfc_core::State;

use crate::topology::Topology;

/// Computes the canonical fingerprint of a topology's candidate sets.
///
/// The digest covers the arena order, each node's candidate list and its
/// slot count, length-prefixed so distinct layouts never collide by
/// concatenation. Equal topologies hash equal, which is what the
/// determinism tests compare across repeated seeded runs.
pub fn canonical_hash<S: State>(topology: &Topology<S>) -> String {
    let mut hasher = Sha256::new();
    hasher.update((topology.nodes.len() as u64).to_le_bytes());
    for node in &topology.nodes {
        hasher.update((node.states.len() as u64).to_le_bytes());
        for state in &node.states {
            let encoded = format!("{state:?}");
            hasher.update((encoded.len() as u64).to_le_bytes());
            hasher.update(encoded.as_bytes());
        }
        hasher.update((node.adjacent.len() as u64).to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
