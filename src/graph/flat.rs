//! `FlatGraph` — a directed-weighted graph addressed by packed integer identifiers.
//!
//! Nodes and edges are pooled like those of [`PoolGraph`](super::PoolGraph) but
//! addressed by `u64` identifiers ([`ObjectId::packed`]) instead of arena handles,
//! and stored in plain vectors. Each node keeps a single list of every edge
//! touching it, incoming or outgoing. Edges record whether they are directed.
//!
//! # Performance
//! Lookups scan the registries linearly:
//! - `node`, `edge`, `add_edge`: O(V + E)
//! - `remove_node`: O(degree · (V + E))
//!
//! Prefer `PoolGraph` unless callers need stable integer identifiers.

use core::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::Weight;
use crate::error::{invariant_violation, GraphError};
use crate::object::{ObjectHeader, ObjectId, ObjectManager, Recyclable};

/// A pooled node addressed by integer identifier.
pub struct FlatNode<V> {
    header: ObjectHeader,
    data: Option<V>,
    edges: Vec<u64>,
}

impl<V> FlatNode<V> {
    fn blank() -> Self {
        Self {
            header: ObjectHeader::new(),
            data: None,
            edges: Vec::new(),
        }
    }

    /// Identity of the node.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.header.id()
    }

    /// Identifier the graph addresses the node by.
    #[inline]
    pub fn identifier(&self) -> u64 {
        self.header.id().packed()
    }

    /// The payload.
    pub fn data(&self) -> &V {
        match &self.data {
            Some(data) => data,
            None => invariant_violation!("live node {} has no payload", self.id()),
        }
    }

    /// Identifiers of every edge touching the node, in insertion order.
    #[inline]
    pub fn edges(&self) -> &[u64] {
        &self.edges
    }

    /// Number of edge entries touching the node.
    #[inline]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

impl<V: Send + 'static> Recyclable for FlatNode<V> {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn recycle(&mut self) {
        self.data = None;
        self.edges.clear();
    }

    fn on_destroy(&mut self) {
        self.data = None;
        self.edges.clear();
    }
}

impl<V: fmt::Debug> fmt::Debug for FlatNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatNode")
            .field("identifier", &format_args!("{:#x}", self.identifier()))
            .field("data", &self.data)
            .field("edges", &self.edges)
            .finish()
    }
}

/// A pooled edge between two node identifiers.
pub struct FlatEdge<W> {
    header: ObjectHeader,
    weight: Option<W>,
    endpoints: Option<(u64, u64)>,
    directed: bool,
}

impl<W> FlatEdge<W> {
    fn blank() -> Self {
        Self {
            header: ObjectHeader::new(),
            weight: None,
            endpoints: None,
            directed: false,
        }
    }

    fn init(&mut self, weight: W, start: u64, end: u64, directed: bool) {
        self.weight = Some(weight);
        self.endpoints = Some((start, end));
        self.directed = directed;
    }

    /// Identity of the edge.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.header.id()
    }

    /// Identifier the graph addresses the edge by.
    #[inline]
    pub fn identifier(&self) -> u64 {
        self.header.id().packed()
    }

    /// The weight.
    pub fn weight(&self) -> &W {
        match &self.weight {
            Some(weight) => weight,
            None => invariant_violation!("live edge {} has no weight", self.id()),
        }
    }

    /// Start node identifier (the source if directed).
    #[inline]
    pub fn start(&self) -> Option<u64> {
        self.endpoints.map(|(start, _)| start)
    }

    /// End node identifier (the destination if directed).
    #[inline]
    pub fn end(&self) -> Option<u64> {
        self.endpoints.map(|(_, end)| end)
    }

    /// Whether the edge only leads from start to end.
    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }
}

impl<W: Send + 'static> Recyclable for FlatEdge<W> {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn recycle(&mut self) {
        self.weight = None;
        self.endpoints = None;
    }

    fn on_destroy(&mut self) {
        self.weight = None;
        self.endpoints = None;
    }
}

impl<W: fmt::Debug> fmt::Debug for FlatEdge<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatEdge")
            .field("identifier", &format_args!("{:#x}", self.identifier()))
            .field("endpoints", &self.endpoints)
            .field("weight", &self.weight)
            .field("directed", &self.directed)
            .finish()
    }
}

/// Identifier-addressed graph of pooled nodes and edges.
pub struct FlatGraph<V, W>
where
    V: Send + 'static,
    W: Weight,
{
    manager: Arc<ObjectManager>,
    nodes: Vec<FlatNode<V>>,
    edges: Vec<FlatEdge<W>>,
}

impl<V, W> FlatGraph<V, W>
where
    V: Send + 'static,
    W: Weight,
{
    /// Creates an empty graph drawing nodes and edges from `manager`.
    pub fn new(manager: Arc<ObjectManager>) -> Self {
        Self {
            manager,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Adds a node with edges to each `(destination, weight)` in `outgoing` and
    /// from each `(source, weight)` in `incoming`. Returns the node's identifier.
    ///
    /// # Errors
    /// [`GraphError::UnknownIdentifier`] if a neighbor is not registered. The node
    /// and any edges already created for it are destroyed first.
    pub fn add_node<I, J>(&mut self, data: V, outgoing: I, incoming: J) -> Result<u64, GraphError>
    where
        I: IntoIterator<Item = (u64, W)>,
        J: IntoIterator<Item = (u64, W)>,
    {
        let mut node = self.manager.create_or_recycle(FlatNode::<V>::blank);
        node.data = Some(data);
        node.edges.clear();
        let id = node.identifier();
        self.nodes.push(node);

        let outgoing = outgoing.into_iter().map(|(to, weight)| (id, to, weight));
        let incoming = incoming.into_iter().map(|(from, weight)| (from, id, weight));

        let mut created = Vec::new();
        for (start, end, weight) in outgoing.chain(incoming) {
            match self.link(start, end, weight, true) {
                Ok(edge) => created.push(edge),
                Err(err) => {
                    warn!(
                        node = format_args!("{id:#x}"),
                        error = %err,
                        rolled_back = created.len(),
                        "failed to link new node, discarding it"
                    );
                    for edge in created.into_iter().rev() {
                        self.retire_edge(edge);
                    }
                    if let Some(node) = self.nodes.pop() {
                        self.release(node);
                    }
                    return Err(err);
                }
            }
        }
        Ok(id)
    }

    /// Adds a directed edge and returns its identifier.
    ///
    /// # Errors
    /// [`GraphError::UnknownIdentifier`] if either node is not registered.
    pub fn add_edge(&mut self, from: u64, to: u64, weight: W) -> Result<u64, GraphError> {
        self.link(from, to, weight, true)
    }

    /// Adds an undirected edge and returns its identifier.
    ///
    /// # Errors
    /// [`GraphError::UnknownIdentifier`] if either node is not registered.
    pub fn add_undirected_edge(&mut self, a: u64, b: u64, weight: W) -> Result<u64, GraphError> {
        self.link(a, b, weight, false)
    }

    /// Removes a node and every edge touching it. Returns the payload.
    ///
    /// # Errors
    /// [`GraphError::UnknownIdentifier`] if `node` is not registered.
    pub fn remove_node(&mut self, node: u64) -> Result<V, GraphError> {
        let Some(position) = self.node_position(node) else {
            warn!(node = format_args!("{node:#x}"), "cannot remove node that is not part of this graph");
            return Err(GraphError::UnknownIdentifier(node));
        };

        let incident = core::mem::take(&mut self.nodes[position].edges);
        let mut removed = 0usize;
        for edge in incident {
            // Self-loops are listed twice.
            if self.edge_position(edge).is_some() {
                self.retire_edge(edge);
                removed += 1;
            }
        }

        let mut object = self.nodes.remove(position);
        let Some(data) = object.data.take() else {
            invariant_violation!("live node {node:#x} has no payload");
        };
        self.release(object);
        debug!(node = format_args!("{node:#x}"), edges = removed, "removed node");
        Ok(data)
    }

    /// Removes an edge and returns its weight.
    ///
    /// # Errors
    /// [`GraphError::UnknownIdentifier`] if `edge` is not registered.
    ///
    /// # Panics
    /// Panics if an endpoint of the edge is not registered.
    pub fn remove_edge(&mut self, edge: u64) -> Result<W, GraphError> {
        if self.edge_position(edge).is_none() {
            warn!(edge = format_args!("{edge:#x}"), "cannot remove edge that is not part of this graph");
            return Err(GraphError::UnknownIdentifier(edge));
        }
        Ok(self.retire_edge(edge))
    }

    /// The node registered under `node`.
    pub fn node(&self, node: u64) -> Option<&FlatNode<V>> {
        self.nodes.iter().find(|n| n.identifier() == node)
    }

    /// The edge registered under `edge`.
    pub fn edge(&self, edge: u64) -> Option<&FlatEdge<W>> {
        self.edges.iter().find(|e| e.identifier() == edge)
    }

    /// Registered nodes in insertion order.
    #[inline]
    pub fn nodes(&self) -> &[FlatNode<V>] {
        &self.nodes
    }

    /// Registered edges in insertion order.
    #[inline]
    pub fn edges(&self) -> &[FlatEdge<W>] {
        &self.edges
    }

    /// Number of registered nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of registered edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Identifiers of the nodes reachable from `node` over one edge.
    ///
    /// Directed edges are only followed from their start.
    pub fn neighbors(&self, node: u64) -> Vec<u64> {
        let Some(origin) = self.node(node) else {
            return Vec::new();
        };
        origin
            .edges
            .iter()
            .filter_map(|&id| self.edge(id))
            .filter_map(|edge| match edge.endpoints? {
                (start, end) if start == node => Some(end),
                (start, end) if end == node && !edge.directed => Some(start),
                _ => None,
            })
            .collect()
    }

    /// Destroys every edge, then every node.
    pub fn clear(&mut self) {
        for edge in core::mem::take(&mut self.edges) {
            self.release(edge);
        }
        for node in core::mem::take(&mut self.nodes) {
            self.release(node);
        }
    }

    fn node_position(&self, node: u64) -> Option<usize> {
        self.nodes.iter().position(|n| n.identifier() == node)
    }

    fn edge_position(&self, edge: u64) -> Option<usize> {
        self.edges.iter().position(|e| e.identifier() == edge)
    }

    fn release<T: Recyclable>(&self, object: T) {
        let id = object.id();
        if let Err(err) = self.manager.destroy(object) {
            invariant_violation!("graph could not return {id} to its pool: {err}");
        }
    }

    fn link(&mut self, start: u64, end: u64, weight: W, directed: bool) -> Result<u64, GraphError> {
        let (Some(from), Some(to)) = (self.node_position(start), self.node_position(end)) else {
            let missing = if self.node_position(start).is_none() { start } else { end };
            warn!(
                start = format_args!("{start:#x}"),
                end = format_args!("{end:#x}"),
                "cannot create edge on missing node"
            );
            return Err(GraphError::UnknownIdentifier(missing));
        };

        let mut edge = self.manager.create_or_recycle(FlatEdge::<W>::blank);
        edge.init(weight, start, end, directed);
        let id = edge.identifier();
        self.nodes[from].edges.push(id);
        self.nodes[to].edges.push(id);
        self.edges.push(edge);
        Ok(id)
    }

    /// Unlinks a registered edge from both endpoints and returns it to the pool.
    fn retire_edge(&mut self, edge: u64) -> W {
        let Some(position) = self.edge_position(edge) else {
            invariant_violation!("edge {edge:#x} is listed but not registered");
        };
        let Some((start, end)) = self.edges[position].endpoints else {
            invariant_violation!("live edge {edge:#x} has no endpoints");
        };
        for endpoint in [start, end] {
            let Some(node) = self.node_position(endpoint) else {
                invariant_violation!("edge {edge:#x} references missing node {endpoint:#x}");
            };
            self.nodes[node].edges.retain(|&e| e != edge);
        }

        let mut object = self.edges.remove(position);
        let Some(weight) = object.weight.take() else {
            invariant_violation!("live edge {edge:#x} has no weight");
        };
        self.release(object);
        weight
    }
}

impl<V, W> Drop for FlatGraph<V, W>
where
    V: Send + 'static,
    W: Weight,
{
    fn drop(&mut self) {
        // A second panic while unwinding would abort.
        if !std::thread::panicking() {
            self.clear();
        }
    }
}

impl<V, W> fmt::Debug for FlatGraph<V, W>
where
    V: Send + 'static,
    W: Weight,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatGraph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> FlatGraph<&'static str, u32> {
        FlatGraph::new(Arc::new(ObjectManager::new()))
    }

    #[test]
    fn node_and_edge_identifiers_never_collide() {
        let mut graph = graph();
        let a = graph.add_node("a", [], []).unwrap();
        let b = graph.add_node("b", [(a, 1)], []).unwrap();
        let edge = graph.node(b).unwrap().edges()[0];
        assert_ne!(edge, a);
        assert_ne!(edge, b);
        assert_eq!(ObjectId::from_packed(a).instance(), 0);
        assert_eq!(ObjectId::from_packed(edge).instance(), 0);
    }

    #[test]
    fn undirected_edges_are_followed_both_ways() {
        let mut graph = graph();
        let a = graph.add_node("a", [], []).unwrap();
        let b = graph.add_node("b", [], []).unwrap();
        graph.add_undirected_edge(a, b, 3).unwrap();
        let c = graph.add_node("c", [], [(b, 4)]).unwrap();

        assert_eq!(graph.neighbors(b), vec![a, c]);
        assert_eq!(graph.neighbors(c), Vec::<u64>::new());
        assert!(!graph.edges()[0].is_directed());
        assert!(graph.edges()[1].is_directed());
    }

    #[test]
    fn self_loop_removal_leaves_no_residue() {
        let mut graph = graph();
        let a = graph.add_node("a", [], []).unwrap();
        graph.add_edge(a, a, 1).unwrap();
        assert_eq!(graph.node(a).unwrap().degree(), 2);
        assert_eq!(graph.remove_node(a), Ok("a"));
        assert_eq!(graph.edge_count(), 0);
    }
}
