//! `PoolGraph` — a dynamic graph whose nodes and edges are issued by an object pool.
//!
//! Nodes and edges come from a shared [`ObjectManager`] and live in two
//! [`SlotArena`]s owned by the graph. Adjacency is stored as handles: each node
//! lists its incident (or outgoing and incoming) edge handles, each edge its two
//! endpoint handles. Removing a node or edge unlinks it from every list that
//! mentions it and hands the object back to the manager for reuse.
//!
//! One generic type covers all four classic variants:
//!
//! | Alias | Weight | Direction |
//! |-------|--------|-----------|
//! | [`Graph`](super::Graph) | `()` | [`Undirected`] |
//! | [`WeightedGraph`](super::WeightedGraph) | `W` | [`Undirected`] |
//! | [`DirectedGraph`](super::DirectedGraph) | `()` | [`Directed`] |
//! | [`DirectedWeightedGraph`](super::DirectedWeightedGraph) | `W` | [`Directed`] |
//!
//! # Performance
//! - `add_node`: O(1) amortized, plus O(1) per linked neighbor
//! - `add_edge`: O(1) amortized
//! - `remove_edge`: O(degree + E) (adjacency scan plus registry removal)
//! - `remove_node`: O(degree · (degree + E))
//! - `node`, `edge`: O(1)
//!
//! Registries keep insertion order, which is what makes the first registered node
//! the root of the lazy traversals.

use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::kind::{Directed, EdgeKind, Undirected};
use super::node::unlink;
use super::{Edge, EdgeIdx, Node, NodeIdx, Weight};
use crate::alloc::SlotArena;
use crate::config::GraphConfig;
use crate::error::{invariant_violation, GraphError, PoolError};
use crate::object::{ObjectHeader, ObjectManager, Recyclable};

/// A neighbor to link a new node to, with the weight of the edge to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<W> {
    /// The existing node at the other end of the edge.
    pub node: NodeIdx,
    /// Weight of the edge.
    pub weight: W,
}

impl<W> Link<W> {
    /// Creates a link.
    pub const fn new(node: NodeIdx, weight: W) -> Self {
        Self { node, weight }
    }
}

impl From<NodeIdx> for Link<()> {
    fn from(node: NodeIdx) -> Self {
        Self { node, weight: () }
    }
}

impl<W> From<(NodeIdx, W)> for Link<W> {
    fn from((node, weight): (NodeIdx, W)) -> Self {
        Self { node, weight }
    }
}

/// A graph of pooled nodes carrying `V` and pooled edges weighted by `W`.
///
/// `D` selects [`Directed`] or [`Undirected`] linking. The graph is not internally
/// synchronized; the shared [`ObjectManager`] is.
pub struct PoolGraph<V, W = (), D = Undirected>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    header: ObjectHeader,
    manager: Option<Arc<ObjectManager>>,
    nodes: SlotArena<Node<V>>,
    edges: SlotArena<Edge<W>>,
    node_order: Vec<NodeIdx>,
    edge_order: Vec<EdgeIdx>,
    _kind: PhantomData<D>,
}

impl<V, W, D> PoolGraph<V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    /// Creates an empty graph drawing nodes and edges from `manager`.
    pub fn new(manager: Arc<ObjectManager>) -> Self {
        Self::with_config(manager, GraphConfig::default())
    }

    /// Creates an empty graph with pre-sized arenas.
    pub fn with_config(manager: Arc<ObjectManager>, config: GraphConfig) -> Self {
        Self {
            header: ObjectHeader::new(),
            manager: Some(manager),
            nodes: SlotArena::with_capacity(config.node_capacity),
            edges: SlotArena::with_capacity(config.edge_capacity),
            node_order: Vec::with_capacity(config.node_capacity),
            edge_order: Vec::with_capacity(config.edge_capacity),
            _kind: PhantomData,
        }
    }

    /// Issues a graph from `manager` itself, reusing a destroyed one if queued.
    ///
    /// Graphs issued this way go back to the manager through
    /// [`PoolGraph::destroy`].
    pub fn create(manager: &Arc<ObjectManager>) -> Self {
        let mut graph = manager.create_or_recycle(|| Self {
            header: ObjectHeader::new(),
            manager: None,
            nodes: SlotArena::new(),
            edges: SlotArena::new(),
            node_order: Vec::new(),
            edge_order: Vec::new(),
            _kind: PhantomData,
        });
        graph.manager = Some(Arc::clone(manager));
        graph.init();
        graph
    }

    /// (Re)initializes the graph to the empty state.
    ///
    /// Anything still registered is destroyed first, edges before nodes.
    pub fn init(&mut self) {
        self.clear();
    }

    /// Destroys every edge, then every node, and empties both registries.
    pub fn clear(&mut self) {
        let (node_count, edge_count) = (self.node_order.len(), self.edge_order.len());

        for edge in core::mem::take(&mut self.edge_order) {
            if let Some(object) = self.edges.remove(edge.key()) {
                self.release(object);
            }
        }
        let stray_edges: Vec<_> = self.edges.drain().collect();
        for object in stray_edges {
            self.release(object);
        }

        for node in core::mem::take(&mut self.node_order) {
            if let Some(object) = self.nodes.remove(node.key()) {
                self.release(object);
            }
        }
        let stray_nodes: Vec<_> = self.nodes.drain().collect();
        for object in stray_nodes {
            self.release(object);
        }

        if node_count + edge_count > 0 {
            debug!(nodes = node_count, edges = edge_count, "cleared graph");
        }
    }

    /// Clears the graph and returns it to its manager if it was issued by one.
    ///
    /// # Errors
    /// Propagates [`PoolError`] if the manager does not recognize the graph.
    pub fn destroy(mut self) -> Result<(), PoolError> {
        if !self.header.id().is_assigned() {
            self.clear();
            return Ok(());
        }
        let manager = self.manager_arc();
        manager.destroy(self)
    }

    /// Adds a node without neighbors.
    pub fn add_node(&mut self, data: V) -> NodeIdx {
        let node = self.acquire_node(data);
        self.node_order.push(node);
        node
    }

    /// Adds a node and links it to every neighbor in `neighbors`.
    ///
    /// In a directed graph each link becomes an edge from the new node to the
    /// neighbor. In an undirected graph the new node is the edge's first endpoint.
    ///
    /// # Errors
    /// [`GraphError::MissingEndpoint`] if a neighbor is not part of this graph. The
    /// new node and every edge already created for it are destroyed before
    /// returning, leaving the graph as it was.
    pub fn add_node_with<I>(&mut self, data: V, neighbors: I) -> Result<NodeIdx, GraphError>
    where
        I: IntoIterator,
        I::Item: Into<Link<W>>,
    {
        self.add_node_linked(data, neighbors, core::iter::empty::<Link<W>>())
    }

    /// Adds an edge between two nodes of this graph.
    ///
    /// # Errors
    /// [`GraphError::MissingEndpoint`] if either endpoint is not part of this graph.
    pub fn add_edge(
        &mut self,
        first: NodeIdx,
        second: NodeIdx,
        weight: W,
    ) -> Result<EdgeIdx, GraphError> {
        self.link(first, second, weight)
    }

    /// Removes a node, destroying every edge incident to it.
    ///
    /// Returns the node's payload.
    ///
    /// # Errors
    /// [`GraphError::UnknownNode`] if `node` is not part of this graph.
    ///
    /// # Panics
    /// Panics if adjacency is found corrupted along the way.
    pub fn remove_node(&mut self, node: NodeIdx) -> Result<V, GraphError> {
        let Some(position) = self.node_order.iter().position(|&n| n == node) else {
            warn!(node = %node, "cannot remove node that is not part of this graph");
            return Err(GraphError::UnknownNode(node));
        };

        let target = self.node_at_mut(node);
        let mut incident = core::mem::take(&mut target.edges);
        incident.append(&mut target.incoming);

        let mut retired: Vec<EdgeIdx> = Vec::with_capacity(incident.len());
        for edge in incident {
            if !self.contains_edge(edge) {
                if retired.contains(&edge) {
                    // Second adjacency entry of a self-loop.
                    continue;
                }
                invariant_violation!("node {node} lists edge {edge}, which is not registered");
            }

            let Some((first, second)) = self.edge_at(edge).endpoints() else {
                invariant_violation!("live edge {edge} has no endpoints");
            };
            if first != node && second != node {
                invariant_violation!("node {node} lists edge {edge} between {first} and {second}");
            }

            if D::DIRECTED {
                if first == node && second != node {
                    self.unlink_from(second, edge, true);
                } else if second == node && first != node {
                    self.unlink_from(first, edge, false);
                }
            } else {
                let other = if first == node { second } else { first };
                if other != node {
                    self.unlink_from(other, edge, false);
                }
            }

            self.retire_edge(edge);
            retired.push(edge);
        }

        self.node_order.remove(position);
        let Some(mut object) = self.nodes.remove(node.key()) else {
            invariant_violation!("registered node {node} has no arena slot");
        };
        let Some(data) = object.take_data() else {
            invariant_violation!("live node {node} has no payload");
        };
        self.release(object);
        debug!(node = %node, edges = retired.len(), "removed node");
        Ok(data)
    }

    /// Removes an edge, returning its weight.
    ///
    /// # Errors
    /// [`GraphError::UnknownEdge`] if `edge` is not part of this graph.
    ///
    /// # Panics
    /// Panics if the edge's endpoints are missing or do not list it; both mean
    /// the graph's adjacency is corrupted.
    pub fn remove_edge(&mut self, edge: EdgeIdx) -> Result<W, GraphError> {
        if !self.contains_edge(edge) {
            warn!(edge = %edge, "cannot remove edge that is not part of this graph");
            return Err(GraphError::UnknownEdge(edge));
        }
        Ok(self.unlink_and_retire(edge))
    }

    /// The node behind `node`, if it is part of this graph.
    #[inline]
    pub fn node(&self, node: NodeIdx) -> Option<&Node<V>> {
        self.nodes
            .get(node.key())
            .filter(|n| n.id().instance() == node.instance())
    }

    /// Exclusive access to the node behind `node`.
    #[inline]
    pub fn node_mut(&mut self, node: NodeIdx) -> Option<&mut Node<V>> {
        self.nodes
            .get_mut(node.key())
            .filter(|n| n.id().instance() == node.instance())
    }

    /// The edge behind `edge`, if it is part of this graph.
    #[inline]
    pub fn edge(&self, edge: EdgeIdx) -> Option<&Edge<W>> {
        self.edges
            .get(edge.key())
            .filter(|e| e.id().instance() == edge.instance())
    }

    /// Exclusive access to the edge behind `edge`.
    #[inline]
    pub fn edge_mut(&mut self, edge: EdgeIdx) -> Option<&mut Edge<W>> {
        self.edges
            .get_mut(edge.key())
            .filter(|e| e.id().instance() == edge.instance())
    }

    /// Payload of `node`.
    #[inline]
    pub fn data(&self, node: NodeIdx) -> Option<&V> {
        self.node(node).map(Node::data)
    }

    /// Exclusive access to the payload of `node`.
    #[inline]
    pub fn data_mut(&mut self, node: NodeIdx) -> Option<&mut V> {
        self.node_mut(node).map(Node::data_mut)
    }

    /// Weight of `edge`.
    #[inline]
    pub fn weight(&self, edge: EdgeIdx) -> Option<&W> {
        self.edge(edge).map(Edge::weight)
    }

    /// Whether `node` is part of this graph.
    #[inline]
    pub fn contains_node(&self, node: NodeIdx) -> bool {
        self.node(node).is_some()
    }

    /// Whether `edge` is part of this graph.
    #[inline]
    pub fn contains_edge(&self, edge: EdgeIdx) -> bool {
        self.edge(edge).is_some()
    }

    /// Number of registered nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    /// Number of registered edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    /// Whether the graph has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_order.is_empty()
    }

    /// Registered node handles in insertion order.
    #[inline]
    pub fn node_ids(&self) -> &[NodeIdx] {
        &self.node_order
    }

    /// Registered edge handles in insertion order.
    #[inline]
    pub fn edge_ids(&self) -> &[EdgeIdx] {
        &self.edge_order
    }

    /// The first registered node, root of the lazy traversals.
    #[inline]
    pub fn first_node(&self) -> Option<NodeIdx> {
        self.node_order.first().copied()
    }

    /// Registered nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<V>> + '_ {
        self.node_order.iter().map(move |&node| self.node_at(node))
    }

    /// Registered edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<W>> + '_ {
        self.edge_order.iter().map(move |&edge| self.edge_at(edge))
    }

    /// Payloads of all registered nodes in insertion order.
    pub fn iter_data(&self) -> impl Iterator<Item = &V> + '_ {
        self.nodes().map(Node::data)
    }

    /// Nodes reachable from `node` over one edge, in edge insertion order.
    ///
    /// Directed graphs follow outgoing edges only. Yields nothing for a node that
    /// is not part of this graph.
    pub fn neighbors(&self, node: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.node(node)
            .map(|n| n.edges.iter())
            .into_iter()
            .flatten()
            .map(move |&edge| self.far_endpoint(edge, node))
    }

    /// First edge leading from `first` to `second` (either way if undirected).
    pub fn find_edge(&self, first: NodeIdx, second: NodeIdx) -> Option<EdgeIdx> {
        self.node(first)?
            .edges
            .iter()
            .copied()
            .find(|&edge| self.far_endpoint(edge, first) == second)
    }

    /// Checks that registries and adjacency lists agree.
    ///
    /// Every registered edge must appear exactly in its endpoints' lists and every
    /// adjacency entry must name a registered edge. Logs the first disagreement.
    pub fn is_consistent(&self) -> bool {
        if self.nodes.len() != self.node_order.len() || self.edges.len() != self.edge_order.len() {
            error!(
                nodes = self.nodes.len(),
                registered_nodes = self.node_order.len(),
                edges = self.edges.len(),
                registered_edges = self.edge_order.len(),
                "arena and registry sizes differ"
            );
            return false;
        }
        if let Some(&node) = self.node_order.iter().find(|&&n| !self.contains_node(n)) {
            error!(node = %node, "registered node does not resolve");
            return false;
        }

        for &edge in &self.edge_order {
            let Some((first, second)) = self.edge(edge).and_then(Edge::endpoints) else {
                error!(edge = %edge, "registered edge does not resolve");
                return false;
            };
            let (Some(a), Some(b)) = (self.node(first), self.node(second)) else {
                error!(edge = %edge, "edge endpoint does not resolve");
                return false;
            };

            let count = |list: &[EdgeIdx]| list.iter().filter(|&&e| e == edge).count();
            let ok = match (D::DIRECTED, first == second) {
                (true, _) => count(&a.edges) == 1 && count(&b.incoming) == 1,
                (false, true) => count(&a.edges) == 2,
                (false, false) => count(&a.edges) == 1 && count(&b.edges) == 1,
            };
            if !ok {
                error!(edge = %edge, first = %first, second = %second, "edge not listed by its endpoints");
                return false;
            }
        }

        let outgoing: usize = self.nodes().map(|n| n.edges.len()).sum();
        let incoming: usize = self.nodes().map(|n| n.incoming.len()).sum();
        let expected = if D::DIRECTED {
            (self.edge_order.len(), self.edge_order.len())
        } else {
            (2 * self.edge_order.len(), 0)
        };
        if (outgoing, incoming) != expected {
            error!(outgoing, incoming, "adjacency lists hold entries for unregistered edges");
            return false;
        }
        true
    }

    /// Upper bound on node slot indices, for per-slot scratch tables.
    #[inline]
    pub(crate) fn node_slots(&self) -> usize {
        self.nodes.slot_count()
    }

    pub(crate) fn node_at(&self, node: NodeIdx) -> &Node<V> {
        match self.node(node) {
            Some(n) => n,
            None => invariant_violation!("node {node} is referenced but not part of the graph"),
        }
    }

    pub(crate) fn edge_at(&self, edge: EdgeIdx) -> &Edge<W> {
        match self.edge(edge) {
            Some(e) => e,
            None => invariant_violation!("edge {edge} is referenced but not part of the graph"),
        }
    }

    /// The endpoint of `edge` a walk standing on `from` moves to.
    pub(crate) fn far_endpoint(&self, edge: EdgeIdx, from: NodeIdx) -> NodeIdx {
        let target = if D::DIRECTED {
            self.edge_at(edge).destination()
        } else {
            self.edge_at(edge).opposite(from)
        };
        match target {
            Some(node) => node,
            None => invariant_violation!("edge {edge} listed by {from} does not lead anywhere from it"),
        }
    }

    fn node_at_mut(&mut self, node: NodeIdx) -> &mut Node<V> {
        match self.node_mut(node) {
            Some(n) => n,
            None => invariant_violation!("node {node} is referenced but not part of the graph"),
        }
    }

    fn manager(&self) -> &ObjectManager {
        match &self.manager {
            Some(manager) => manager,
            None => invariant_violation!("graph {} is detached from its object manager", self.header.id()),
        }
    }

    fn manager_arc(&self) -> Arc<ObjectManager> {
        match &self.manager {
            Some(manager) => Arc::clone(manager),
            None => invariant_violation!("graph {} is detached from its object manager", self.header.id()),
        }
    }

    fn release<T: Recyclable>(&self, object: T) {
        let id = object.id();
        if let Err(err) = self.manager().destroy(object) {
            invariant_violation!("graph could not return {id} to its pool: {err}");
        }
    }

    fn acquire_node(&mut self, data: V) -> NodeIdx {
        let mut node = self.manager().create_or_recycle(Node::<V>::blank);
        node.init(data);
        let instance = node.id().instance();
        NodeIdx::new(self.nodes.insert(node), instance)
    }

    pub(super) fn add_node_linked<I, J>(
        &mut self,
        data: V,
        outgoing: I,
        incoming: J,
    ) -> Result<NodeIdx, GraphError>
    where
        I: IntoIterator,
        I::Item: Into<Link<W>>,
        J: IntoIterator,
        J::Item: Into<Link<W>>,
    {
        let node = self.acquire_node(data);
        let outgoing = outgoing
            .into_iter()
            .map(|link| -> (bool, Link<W>) { (true, link.into()) });
        let incoming = incoming
            .into_iter()
            .map(|link| -> (bool, Link<W>) { (false, link.into()) });

        let mut created = Vec::new();
        for (leaves_node, Link { node: neighbor, weight }) in outgoing.chain(incoming) {
            let linked = if leaves_node {
                self.link(node, neighbor, weight)
            } else {
                self.link(neighbor, node, weight)
            };
            match linked {
                Ok(edge) => created.push(edge),
                Err(err) => {
                    warn!(
                        node = %node,
                        error = %err,
                        rolled_back = created.len(),
                        "failed to link new node, discarding it"
                    );
                    for edge in created.into_iter().rev() {
                        self.unlink_and_retire(edge);
                    }
                    if let Some(object) = self.nodes.remove(node.key()) {
                        self.release(object);
                    }
                    return Err(err);
                }
            }
        }

        self.node_order.push(node);
        Ok(node)
    }

    fn link(&mut self, first: NodeIdx, second: NodeIdx, weight: W) -> Result<EdgeIdx, GraphError> {
        for endpoint in [first, second] {
            if !self.contains_node(endpoint) {
                warn!(node = %endpoint, "cannot create edge on missing node");
                return Err(GraphError::MissingEndpoint(endpoint));
            }
        }

        let mut object = self.manager().create_or_recycle(Edge::<W>::blank);
        object.init(first, second, weight);
        let instance = object.id().instance();
        let edge = EdgeIdx::new(self.edges.insert(object), instance);

        self.node_at_mut(first).edges.push(edge);
        let target = self.node_at_mut(second);
        if D::DIRECTED {
            target.incoming.push(edge);
        } else {
            target.edges.push(edge);
        }

        self.edge_order.push(edge);
        Ok(edge)
    }

    fn unlink_from(&mut self, node: NodeIdx, edge: EdgeIdx, incoming: bool) {
        let target = self.node_at_mut(node);
        let list = if incoming {
            &mut target.incoming
        } else {
            &mut target.edges
        };
        if !unlink(list, edge) {
            invariant_violation!("edge {edge} is missing from the adjacency of {node}");
        }
    }

    fn unlink_and_retire(&mut self, edge: EdgeIdx) -> W {
        let Some((first, second)) = self.edge_at(edge).endpoints() else {
            invariant_violation!("live edge {edge} has no endpoints");
        };
        self.unlink_from(first, edge, false);
        self.unlink_from(second, edge, D::DIRECTED);
        self.retire_edge(edge)
    }

    fn retire_edge(&mut self, edge: EdgeIdx) -> W {
        if let Some(position) = self.edge_order.iter().position(|&e| e == edge) {
            self.edge_order.remove(position);
        }
        let Some(mut object) = self.edges.remove(edge.key()) else {
            invariant_violation!("live edge {edge} has no arena slot");
        };
        let Some(weight) = object.take_weight() else {
            invariant_violation!("live edge {edge} has no weight");
        };
        self.release(object);
        weight
    }
}

impl<V, W> PoolGraph<V, W, Directed>
where
    V: Send + 'static,
    W: Weight,
{
    /// Adds a node with edges to each of `outgoing` and from each of `incoming`.
    ///
    /// # Errors
    /// Same as [`PoolGraph::add_node_with`], with the same rollback.
    pub fn add_node_with_incoming<I, J>(
        &mut self,
        data: V,
        outgoing: I,
        incoming: J,
    ) -> Result<NodeIdx, GraphError>
    where
        I: IntoIterator,
        I::Item: Into<Link<W>>,
        J: IntoIterator,
        J::Item: Into<Link<W>>,
    {
        self.add_node_linked(data, outgoing, incoming)
    }

    /// Sources of the edges entering `node`, in edge insertion order.
    pub fn predecessors(&self, node: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.node(node)
            .map(|n| n.incoming.iter())
            .into_iter()
            .flatten()
            .filter_map(move |&edge| self.edge_at(edge).source())
    }
}

impl<V, D> PoolGraph<V, (), D>
where
    V: Send + 'static,
    D: EdgeKind,
{
    /// Adds an unweighted edge. Shorthand for `add_edge(first, second, ())`.
    ///
    /// # Errors
    /// Same as [`PoolGraph::add_edge`].
    pub fn connect(&mut self, first: NodeIdx, second: NodeIdx) -> Result<EdgeIdx, GraphError> {
        self.add_edge(first, second, ())
    }
}

impl<V, W, D> Recyclable for PoolGraph<V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn on_destroy(&mut self) {
        self.clear();
        // A queued graph must not keep its manager alive.
        self.manager = None;
    }
}

impl<V, W, D> Drop for PoolGraph<V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    fn drop(&mut self) {
        // Queued graphs were cleared and detached in `on_destroy`. A second
        // panic while unwinding would abort.
        if self.manager.is_some() && !std::thread::panicking() {
            self.clear();
        }
    }
}

impl<V, W, D> fmt::Debug for PoolGraph<V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolGraph")
            .field("id", &self.header.id())
            .field("directed", &D::DIRECTED)
            .field("nodes", &self.node_order.len())
            .field("edges", &self.edge_order.len())
            .finish()
    }
}
