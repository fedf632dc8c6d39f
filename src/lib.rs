//! # `recycle_graph` - Pooled Graphs with Recyclable Nodes and Edges
//!
//! A generic graph toolkit whose nodes and edges are issued by a thread-safe
//! [`ObjectManager`]. Destroyed objects are queued per type and handed out again
//! instead of being reallocated, so a graph that is constantly rebuilt reaches an
//! allocation-free steady state.
//!
//! ## Layers
//!
//! 1. **Recyclable objects** ([`object`]): every pooled object embeds an
//!    [`ObjectHeader`] carrying its identity, a `(type tag, instance id)` pair.
//!    Identity survives recycling: a reissued object is logically new but compares
//!    equal to the object it used to be.
//! 2. **Object manager** ([`ObjectManager`]): one sub-pool per concrete Rust type,
//!    each with its own instance-id counter and recycle queue behind a lock.
//! 3. **Slot arena** ([`alloc::SlotArena`]): generational, index-addressed storage
//!    with free-list reuse. Graphs keep their live nodes and edges here and express
//!    all adjacency as slot keys, so there are no reference cycles between nodes and
//!    edges and a handle outliving its node never resolves again.
//! 4. **Graphs** ([`graph`]): one [`PoolGraph`] generic over payload, weight and
//!    direction covers the plain, weighted, directed and directed-weighted variants.
//!    Depth-first and breadth-first walks are exposed both as one-shot searches and
//!    as restartable lazy sequences.
//!
//! ## Ownership
//!
//! The manager owns destroyed instances, a graph owns its live ones. Nodes hold
//! edge indices, edges hold node indices, and neither owns the other.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use recycle_graph::{DirectedGraph, ObjectManager};
//!
//! let manager = Arc::new(ObjectManager::new());
//! let mut graph = DirectedGraph::new(Arc::clone(&manager));
//!
//! let a = graph.add_node("A");
//! let b = graph.add_node("B");
//! let c = graph.add_node("C");
//! graph.connect(a, b).unwrap();
//! graph.connect(b, c).unwrap();
//!
//! let found = graph.breadth_first_search(a, |n| *n.data() == "C");
//! assert_eq!(found, Some(c));
//!
//! let order: Vec<_> = graph.depth_first().data().copied().collect();
//! assert_eq!(order, ["A", "B", "C"]);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod alloc;
pub mod config;
pub mod error;
pub mod graph;
pub mod object;

pub use config::{GraphConfig, PoolConfig};
pub use error::{ConfigError, GraphError, PoolError};
pub use graph::{
    Directed, DirectedGraph, DirectedWeightedGraph, Edge, EdgeIdx, EdgeKind, FlatEdge, FlatGraph,
    FlatNode, Graph, Link, Node, NodeIdx, PoolGraph, Step, Undirected, Weight, WeightedGraph,
};
pub use object::{InstanceId, ObjectHeader, ObjectId, ObjectManager, PoolStats, Recyclable, TypeTag};

// Compile-time assertions for handle layout
const _: () = {
    use core::mem;

    // Handles are passed by value everywhere; keep them two words or less.
    assert!(mem::size_of::<ObjectId>() == 8);
    assert!(mem::size_of::<NodeIdx>() == 12);
    assert!(mem::size_of::<EdgeIdx>() == 12);

    // Marker types carry no data.
    assert!(mem::size_of::<Directed>() == 0);
    assert!(mem::size_of::<Undirected>() == 0);
};
