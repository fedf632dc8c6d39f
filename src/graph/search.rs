//! First-match searches over the traversal walks.

use tracing::warn;

use super::kind::EdgeKind;
use super::{Node, NodeIdx, PoolGraph, Weight};

impl<V, W, D> PoolGraph<V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    /// Visits nodes depth-first from `start` and returns the first one matching
    /// `predicate`.
    ///
    /// `start` itself is tested first. Returns `None` if nothing reachable
    /// matches, or if `start` is not part of this graph.
    pub fn depth_first_search<P>(&self, start: NodeIdx, mut predicate: P) -> Option<NodeIdx>
    where
        P: FnMut(&Node<V>) -> bool,
    {
        if !self.contains_node(start) {
            warn!(node = %start, "depth-first search from a node outside this graph");
            return None;
        }
        self.depth_first_from(start)
            .steps()
            .map(|step| step.node)
            .find(|&node| predicate(self.node_at(node)))
    }

    /// Visits nodes breadth-first from `start` and returns the first one matching
    /// `predicate`.
    ///
    /// Nodes closer to `start` (in edges) are tested before farther ones.
    pub fn breadth_first_search<P>(&self, start: NodeIdx, mut predicate: P) -> Option<NodeIdx>
    where
        P: FnMut(&Node<V>) -> bool,
    {
        if !self.contains_node(start) {
            warn!(node = %start, "breadth-first search from a node outside this graph");
            return None;
        }
        self.breadth_first_from(start)
            .steps()
            .map(|step| step.node)
            .find(|&node| predicate(self.node_at(node)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::graph::WeightedGraph;
    use crate::ObjectManager;

    #[test]
    fn predicate_sees_nodes_in_walk_order() {
        let mut graph = WeightedGraph::new(Arc::new(ObjectManager::new()));
        let a = graph.add_node('a');
        let b = graph.add_node_with('b', [(a, 9u32)]).unwrap();
        graph.add_node_with('c', [(a, 1u32)]).unwrap();
        graph.add_node_with('d', [(b, 1u32)]).unwrap();

        let mut seen = String::new();
        let found = graph.breadth_first_search(a, |n| {
            seen.push(*n.data());
            false
        });
        assert_eq!(found, None);
        assert_eq!(seen, "acbd");

        seen.clear();
        graph.depth_first_search(a, |n| {
            seen.push(*n.data());
            false
        });
        assert_eq!(seen, "acbd");
    }

    #[test]
    fn start_is_tested_first() {
        let mut graph = WeightedGraph::new(Arc::new(ObjectManager::new()));
        let a = graph.add_node(1);
        graph.add_node_with(1, [(a, 0u8)]).unwrap();
        assert_eq!(graph.depth_first_search(a, |n| *n.data() == 1), Some(a));
        assert_eq!(graph.breadth_first_search(a, |n| *n.data() == 1), Some(a));
    }
}
