//! Edge direction markers.

/// Selects how a [`PoolGraph`](super::PoolGraph) links edges into adjacency lists.
pub trait EdgeKind: Send + Sync + 'static {
    /// `true` if edges only lead from source to destination.
    const DIRECTED: bool;
}

/// Edges lead from a source to a destination.
///
/// The source lists the edge as outgoing, the destination as incoming, and
/// traversals only follow outgoing edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Directed;

/// Edges connect two endpoints symmetrically.
///
/// Both endpoints list the edge in their single incident list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Undirected;

impl EdgeKind for Directed {
    const DIRECTED: bool = true;
}

impl EdgeKind for Undirected {
    const DIRECTED: bool = false;
}
