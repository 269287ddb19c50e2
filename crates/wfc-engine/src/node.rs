use wfc_core::NodeId;

/// A cell of the constraint graph.
///
/// Pure data: the live candidate set plus the ordered adjacency slots. The
/// slot order is semantically meaningful for directional compatibility
/// strategies (Cartesian grids use slot `2a` for the negative direction
/// along axis `a` and `2a + 1` for the positive one); non-directional
/// graphs only rely on membership. A `None` slot marks an absent neighbor,
/// e.g. the boundary of a non-periodic grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<S> {
    /// Live candidate set, shrunk by stable filtering during propagation.
    pub states: Vec<S>,
    /// Ordered neighbor slots referring into the owning arena.
    pub adjacent: Vec<Option<NodeId>>,
}

impl<S> Node<S> {
    /// Creates a node with the given candidates and no neighbors.
    pub fn new(states: Vec<S>) -> Self {
        Self {
            states,
            adjacent: Vec::new(),
        }
    }

    /// Number of live candidates; the entropy the engine minimizes.
    pub fn entropy(&self) -> usize {
        self.states.len()
    }

    /// Whether the cell has been forced to a single state.
    pub fn is_settled(&self) -> bool {
        self.states.len() == 1
    }
}
