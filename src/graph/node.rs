//! Graph nodes and their handles.

use core::fmt;
use core::hash::{Hash, Hasher};

use super::EdgeIdx;
use crate::alloc::SlotKey;
use crate::error::invariant_violation;
use crate::object::{InstanceId, ObjectHeader, ObjectId, Recyclable};

/// Handle to a node slot in one graph.
///
/// Carries the generational key of the node's arena slot and the node's instance
/// id. A handle kept past [`remove_node`](super::PoolGraph::remove_node) never
/// resolves again, even after the slot and the pooled node are both reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx {
    key: SlotKey,
    instance: InstanceId,
}

impl NodeIdx {
    #[inline]
    pub(crate) fn new(key: SlotKey, instance: InstanceId) -> Self {
        Self { key, instance }
    }

    #[inline]
    pub(crate) fn key(self) -> SlotKey {
        self.key
    }

    /// Arena slot of the node.
    #[inline]
    pub fn slot(self) -> usize {
        self.key.index()
    }

    /// Generation of the slot when the node was stored in it.
    #[inline]
    pub fn generation(self) -> u32 {
        self.key.generation()
    }

    /// Instance id of the node within its sub-pool.
    #[inline]
    pub fn instance(self) -> InstanceId {
        self.instance
    }
}

impl fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}.{}@{}", self.slot(), self.generation(), self.instance)
    }
}

/// A pooled graph node holding a payload and the edges incident to it.
///
/// Undirected graphs list every incident edge in [`Node::edges`]; a self-loop
/// appears there twice. Directed graphs list outgoing edges there and incoming
/// ones in [`Node::incoming_edges`].
pub struct Node<V> {
    header: ObjectHeader,
    data: Option<V>,
    pub(super) edges: Vec<EdgeIdx>,
    pub(super) incoming: Vec<EdgeIdx>,
}

impl<V> Node<V> {
    pub(crate) fn blank() -> Self {
        Self {
            header: ObjectHeader::new(),
            data: None,
            edges: Vec::new(),
            incoming: Vec::new(),
        }
    }

    pub(crate) fn init(&mut self, data: V) {
        self.data = Some(data);
        self.edges.clear();
        self.incoming.clear();
    }

    /// Identity of the node.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.header.id()
    }

    /// The payload.
    #[inline]
    pub fn data(&self) -> &V {
        match &self.data {
            Some(data) => data,
            None => invariant_violation!("live node {} has no payload", self.id()),
        }
    }

    /// Exclusive access to the payload.
    #[inline]
    pub fn data_mut(&mut self) -> &mut V {
        let id = self.id();
        match &mut self.data {
            Some(data) => data,
            None => invariant_violation!("live node {id} has no payload"),
        }
    }

    /// Incident edges (undirected) or outgoing edges (directed), in insertion order.
    #[inline]
    pub fn edges(&self) -> &[EdgeIdx] {
        &self.edges
    }

    /// Outgoing edges of a directed node.
    ///
    /// Undirected edges have no direction, so on an undirected node this is every
    /// incident edge, the same list as [`Node::edges`].
    #[inline]
    pub fn outgoing_edges(&self) -> &[EdgeIdx] {
        &self.edges
    }

    /// Incoming edges. Always empty in undirected graphs.
    #[inline]
    pub fn incoming_edges(&self) -> &[EdgeIdx] {
        &self.incoming
    }

    /// Total number of adjacency entries.
    #[inline]
    pub fn degree(&self) -> usize {
        self.edges.len() + self.incoming.len()
    }

    pub(super) fn take_data(&mut self) -> Option<V> {
        self.data.take()
    }

    fn reset(&mut self) {
        self.data = None;
        self.edges.clear();
        self.incoming.clear();
    }
}

impl<V: Send + 'static> Recyclable for Node<V> {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn recycle(&mut self) {
        self.reset();
    }

    fn on_destroy(&mut self) {
        self.reset();
    }
}

impl<V> PartialEq for Node<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<V> Eq for Node<V> {}

impl<V> Hash for Node<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("data", &self.data)
            .field("edges", &self.edges)
            .field("incoming", &self.incoming)
            .finish()
    }
}

/// Removes the first occurrence of `edge`, preserving the order of the rest.
pub(super) fn unlink(list: &mut Vec<EdgeIdx>, edge: EdgeIdx) -> bool {
    match list.iter().position(|&e| e == edge) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}
