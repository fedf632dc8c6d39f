//! Graph edges and their handles.

use core::fmt;
use core::hash::{Hash, Hasher};

use super::NodeIdx;
use crate::alloc::SlotKey;
use crate::error::invariant_violation;
use crate::object::{InstanceId, ObjectHeader, ObjectId, Recyclable};

/// Handle to an edge slot in one graph. See [`NodeIdx`] for staleness rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIdx {
    key: SlotKey,
    instance: InstanceId,
}

impl EdgeIdx {
    #[inline]
    pub(crate) fn new(key: SlotKey, instance: InstanceId) -> Self {
        Self { key, instance }
    }

    #[inline]
    pub(crate) fn key(self) -> SlotKey {
        self.key
    }

    /// Arena slot of the edge.
    #[inline]
    pub fn slot(self) -> usize {
        self.key.index()
    }

    /// Generation of the slot when the edge was stored in it.
    #[inline]
    pub fn generation(self) -> u32 {
        self.key.generation()
    }

    /// Instance id of the edge within its sub-pool.
    #[inline]
    pub fn instance(self) -> InstanceId {
        self.instance
    }
}

impl fmt::Display for EdgeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}.{}@{}", self.slot(), self.generation(), self.instance)
    }
}

/// A pooled edge between two nodes, carrying a weight.
///
/// In directed graphs the first endpoint is the source and the second the
/// destination. Endpoints are only cleared when the edge is destroyed, so every
/// edge reachable through a graph has both.
pub struct Edge<W> {
    header: ObjectHeader,
    endpoints: Option<(NodeIdx, NodeIdx)>,
    weight: Option<W>,
}

impl<W> Edge<W> {
    pub(crate) fn blank() -> Self {
        Self {
            header: ObjectHeader::new(),
            endpoints: None,
            weight: None,
        }
    }

    pub(crate) fn init(&mut self, first: NodeIdx, second: NodeIdx, weight: W) {
        self.endpoints = Some((first, second));
        self.weight = Some(weight);
    }

    /// Identity of the edge.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.header.id()
    }

    /// Both endpoints, `None` only once destroyed.
    #[inline]
    pub fn endpoints(&self) -> Option<(NodeIdx, NodeIdx)> {
        self.endpoints
    }

    /// Source node of a directed edge.
    #[inline]
    pub fn source(&self) -> Option<NodeIdx> {
        self.endpoints.map(|(source, _)| source)
    }

    /// Destination node of a directed edge.
    #[inline]
    pub fn destination(&self) -> Option<NodeIdx> {
        self.endpoints.map(|(_, destination)| destination)
    }

    /// First endpoint of an undirected edge. Same as [`Edge::source`].
    #[inline]
    pub fn first(&self) -> Option<NodeIdx> {
        self.source()
    }

    /// Second endpoint of an undirected edge. Same as [`Edge::destination`].
    #[inline]
    pub fn second(&self) -> Option<NodeIdx> {
        self.destination()
    }

    /// The endpoint across from `node`, or `None` if `node` is not an endpoint.
    ///
    /// A self-loop returns `node` itself.
    pub fn opposite(&self, node: NodeIdx) -> Option<NodeIdx> {
        let (first, second) = self.endpoints?;
        if second == node {
            Some(first)
        } else if first == node {
            Some(second)
        } else {
            None
        }
    }

    /// The weight.
    #[inline]
    pub fn weight(&self) -> &W {
        match &self.weight {
            Some(weight) => weight,
            None => invariant_violation!("live edge {} has no weight", self.id()),
        }
    }

    /// Replaces the weight, returning the previous one.
    pub fn set_weight(&mut self, weight: W) -> W {
        let id = self.id();
        match self.weight.replace(weight) {
            Some(previous) => previous,
            None => invariant_violation!("live edge {id} has no weight"),
        }
    }

    pub(super) fn take_weight(&mut self) -> Option<W> {
        self.weight.take()
    }

    fn reset(&mut self) {
        self.endpoints = None;
        self.weight = None;
    }
}

impl<W: Send + 'static> Recyclable for Edge<W> {
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

impl<W> PartialEq for Edge<W> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<W> Eq for Edge<W> {}

impl<W> Hash for Edge<W> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<W: fmt::Debug> fmt::Debug for Edge<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("id", &self.id())
            .field("endpoints", &self.endpoints)
            .field("weight", &self.weight)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::SlotArena;

    fn handles(count: u32) -> Vec<NodeIdx> {
        let mut arena = SlotArena::new();
        (0..count).map(|i| NodeIdx::new(arena.insert(()), i)).collect()
    }

    #[test]
    fn opposite_handles_self_loops_and_strangers() {
        let nodes = handles(3);
        let (a, b, c) = (nodes[0], nodes[1], nodes[2]);

        let mut edge = Edge::blank();
        edge.init(a, b, 3u32);
        assert_eq!(edge.opposite(a), Some(b));
        assert_eq!(edge.opposite(b), Some(a));
        assert_eq!(edge.opposite(c), None);

        edge.init(a, a, 1);
        assert_eq!(edge.opposite(a), Some(a));
    }

    #[test]
    fn destroy_hook_clears_endpoints() {
        let nodes = handles(2);
        let mut edge = Edge::blank();
        edge.init(nodes[0], nodes[1], 7i64);
        assert_eq!(edge.set_weight(9), 7);
        edge.on_destroy();
        assert_eq!(edge.endpoints(), None);
        assert_eq!(edge.source(), None);
    }
}
