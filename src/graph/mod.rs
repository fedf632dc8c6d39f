//! Pooled graphs and their traversals.
//!
//! - [`PoolGraph`]: arena-backed graph over pooled [`Node`]s and [`Edge`]s, with
//!   aliases for the four classic variants
//! - `traversal`: restartable depth-first and breadth-first walks
//! - `search`: first-match searches built on the walks
//! - [`FlatGraph`]: identifier-addressed directed-weighted graph kept for callers
//!   that address nodes by packed integer identifiers

mod edge;
mod flat;
mod kind;
mod node;
mod pool_graph;
mod search;
mod traversal;
mod weight;

pub use edge::{Edge, EdgeIdx};
pub use flat::{FlatEdge, FlatGraph, FlatNode};
pub use kind::{Directed, EdgeKind, Undirected};
pub use node::{Node, NodeIdx};
pub use pool_graph::{Link, PoolGraph};
pub use traversal::{
    BreadthFirst, BreadthFirstWalk, DepthFirst, DepthFirstWalk, Step, TraversalData,
    TraversalEdges, TraversalNodes,
};
pub use weight::Weight;

/// Undirected, unweighted graph.
pub type Graph<V> = PoolGraph<V, (), Undirected>;

/// Undirected graph with edge weights `W`.
pub type WeightedGraph<V, W> = PoolGraph<V, W, Undirected>;

/// Directed, unweighted graph.
pub type DirectedGraph<V> = PoolGraph<V, (), Directed>;

/// Directed graph with edge weights `W`.
pub type DirectedWeightedGraph<V, W> = PoolGraph<V, W, Directed>;
