//! `DepthFirst` / `BreadthFirst` — restartable lazy walks over a [`PoolGraph`].
//!
//! A walk yields [`Step`]s: the node reached and the edge it was reached over
//! (`None` for the start). Only nodes reachable from the start are visited, each
//! exactly once.
//!
//! Neighbor order follows edge weights:
//! - depth-first pushes unreached neighbors heaviest first, so the lightest is
//!   explored next
//! - breadth-first enqueues unreached neighbors lightest first
//!
//! Ties, and every neighbor of an unweighted graph, keep edge insertion order.
//!
//! The views returned by [`PoolGraph::depth_first`] and friends hold no cursor:
//! each call to [`DepthFirst::nodes`] (or `edges`, `data`, `steps`) starts a new
//! walk from the beginning.
//!
//! # Performance
//! - O(V + E log Δ) per full walk, Δ being the largest degree
//! - one `Vec<bool>` of visited flags per walk, sized by arena slots

use std::collections::VecDeque;

use super::kind::EdgeKind;
use super::weight::{sort_by_weight, WeightOrder};
use super::{Edge, EdgeIdx, Node, NodeIdx, PoolGraph, Weight};

/// One step of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    /// Edge the node was discovered over; `None` for the start node.
    pub edge: Option<EdgeIdx>,
    /// The node reached.
    pub node: NodeIdx,
}

impl Step {
    #[inline]
    const fn root(node: NodeIdx) -> Self {
        Self { edge: None, node }
    }
}

/// Collects the unreached neighbors of `node` into `out`, sorted by edge weight.
fn frontier<V, W, D>(
    graph: &PoolGraph<V, W, D>,
    node: NodeIdx,
    reached: &[bool],
    order: WeightOrder,
    out: &mut Vec<(EdgeIdx, NodeIdx)>,
) where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    out.clear();
    for &edge in &graph.node_at(node).edges {
        let next = graph.far_endpoint(edge, node);
        if !reached[next.slot()] {
            out.push((edge, next));
        }
    }
    sort_by_weight(out, order, |&(edge, _)| graph.edge_at(edge).weight());
}

/// Depth-first walk. Created through [`DepthFirst`].
pub struct DepthFirstWalk<'g, V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    graph: &'g PoolGraph<V, W, D>,
    stack: Vec<Step>,
    reached: Vec<bool>,
    scratch: Vec<(EdgeIdx, NodeIdx)>,
}

impl<'g, V, W, D> DepthFirstWalk<'g, V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    fn new(graph: &'g PoolGraph<V, W, D>, start: Option<NodeIdx>) -> Self {
        let stack = start
            .filter(|&node| graph.contains_node(node))
            .map(Step::root)
            .into_iter()
            .collect();
        Self {
            graph,
            stack,
            reached: vec![false; graph.node_slots()],
            scratch: Vec::new(),
        }
    }
}

impl<V, W, D> Iterator for DepthFirstWalk<'_, V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            let step = self.stack.pop()?;
            if self.reached[step.node.slot()] {
                continue;
            }
            self.reached[step.node.slot()] = true;

            frontier(
                self.graph,
                step.node,
                &self.reached,
                WeightOrder::Descending,
                &mut self.scratch,
            );
            self.stack.extend(
                self.scratch
                    .iter()
                    .map(|&(edge, node)| Step { edge: Some(edge), node }),
            );
            return Some(step);
        }
    }
}

/// Breadth-first walk. Created through [`BreadthFirst`].
pub struct BreadthFirstWalk<'g, V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    graph: &'g PoolGraph<V, W, D>,
    queue: VecDeque<Step>,
    reached: Vec<bool>,
    scratch: Vec<(EdgeIdx, NodeIdx)>,
}

impl<'g, V, W, D> BreadthFirstWalk<'g, V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    fn new(graph: &'g PoolGraph<V, W, D>, start: Option<NodeIdx>) -> Self {
        let mut reached = vec![false; graph.node_slots()];
        let mut queue = VecDeque::new();
        if let Some(start) = start.filter(|&node| graph.contains_node(node)) {
            reached[start.slot()] = true;
            queue.push_back(Step::root(start));
        }
        Self {
            graph,
            queue,
            reached,
            scratch: Vec::new(),
        }
    }
}

impl<V, W, D> Iterator for BreadthFirstWalk<'_, V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let step = self.queue.pop_front()?;
        frontier(
            self.graph,
            step.node,
            &self.reached,
            WeightOrder::Ascending,
            &mut self.scratch,
        );
        for &(edge, node) in &self.scratch {
            // The frontier may name one neighbor over several parallel edges.
            if !self.reached[node.slot()] {
                self.reached[node.slot()] = true;
                self.queue.push_back(Step { edge: Some(edge), node });
            }
        }
        Some(step)
    }
}

/// Maps a walk to the nodes it reaches.
pub struct TraversalNodes<'g, V, W, D, I>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    graph: &'g PoolGraph<V, W, D>,
    walk: I,
}

impl<'g, V, W, D, I> Iterator for TraversalNodes<'g, V, W, D, I>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
    I: Iterator<Item = Step>,
{
    type Item = &'g Node<V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        self.walk.next().map(|step| graph.node_at(step.node))
    }
}

/// Maps a walk to the discovery edges it follows. The start contributes none.
pub struct TraversalEdges<'g, V, W, D, I>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    graph: &'g PoolGraph<V, W, D>,
    walk: I,
}

impl<'g, V, W, D, I> Iterator for TraversalEdges<'g, V, W, D, I>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
    I: Iterator<Item = Step>,
{
    type Item = &'g Edge<W>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        self.walk
            .by_ref()
            .find_map(|step| step.edge)
            .map(|edge| graph.edge_at(edge))
    }
}

/// Maps a walk to the payloads of the nodes it reaches.
pub struct TraversalData<'g, V, W, D, I>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    graph: &'g PoolGraph<V, W, D>,
    walk: I,
}

impl<'g, V, W, D, I> Iterator for TraversalData<'g, V, W, D, I>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
    I: Iterator<Item = Step>,
{
    type Item = &'g V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        self.walk.next().map(|step| graph.node_at(step.node).data())
    }
}

macro_rules! traversal_view {
    ($(#[$doc:meta])* $view:ident => $walk:ident) => {
        $(#[$doc])*
        pub struct $view<'g, V, W, D>
        where
            V: Send + 'static,
            W: Weight,
            D: EdgeKind,
        {
            graph: &'g PoolGraph<V, W, D>,
            start: Option<NodeIdx>,
        }

        impl<V, W, D> Clone for $view<'_, V, W, D>
        where
            V: Send + 'static,
            W: Weight,
            D: EdgeKind,
        {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<V, W, D> Copy for $view<'_, V, W, D>
        where
            V: Send + 'static,
            W: Weight,
            D: EdgeKind,
        {
        }

        impl<'g, V, W, D> $view<'g, V, W, D>
        where
            V: Send + 'static,
            W: Weight,
            D: EdgeKind,
        {
            /// Node the walk starts from, if any.
            #[inline]
            pub fn start(&self) -> Option<NodeIdx> {
                self.start
            }

            /// A fresh walk yielding [`Step`]s.
            #[inline]
            pub fn steps(&self) -> $walk<'g, V, W, D> {
                $walk::new(self.graph, self.start)
            }

            /// A fresh walk yielding nodes.
            #[inline]
            pub fn nodes(&self) -> TraversalNodes<'g, V, W, D, $walk<'g, V, W, D>> {
                TraversalNodes { graph: self.graph, walk: self.steps() }
            }

            /// A fresh walk yielding discovery edges.
            #[inline]
            pub fn edges(&self) -> TraversalEdges<'g, V, W, D, $walk<'g, V, W, D>> {
                TraversalEdges { graph: self.graph, walk: self.steps() }
            }

            /// A fresh walk yielding node payloads.
            #[inline]
            pub fn data(&self) -> TraversalData<'g, V, W, D, $walk<'g, V, W, D>> {
                TraversalData { graph: self.graph, walk: self.steps() }
            }
        }

        impl<'g, V, W, D> IntoIterator for &$view<'g, V, W, D>
        where
            V: Send + 'static,
            W: Weight,
            D: EdgeKind,
        {
            type Item = Step;
            type IntoIter = $walk<'g, V, W, D>;

            fn into_iter(self) -> Self::IntoIter {
                self.steps()
            }
        }
    };
}

traversal_view! {
    /// Restartable depth-first view of a graph.
    DepthFirst => DepthFirstWalk
}

traversal_view! {
    /// Restartable breadth-first view of a graph.
    BreadthFirst => BreadthFirstWalk
}

impl<V, W, D> PoolGraph<V, W, D>
where
    V: Send + 'static,
    W: Weight,
    D: EdgeKind,
{
    /// Depth-first view rooted at the first registered node.
    ///
    /// Empty for an empty graph.
    #[inline]
    pub fn depth_first(&self) -> DepthFirst<'_, V, W, D> {
        DepthFirst {
            graph: self,
            start: self.first_node(),
        }
    }

    /// Depth-first view rooted at `start`. Empty if `start` is not in the graph.
    #[inline]
    pub fn depth_first_from(&self, start: NodeIdx) -> DepthFirst<'_, V, W, D> {
        DepthFirst {
            graph: self,
            start: Some(start),
        }
    }

    /// Breadth-first view rooted at the first registered node.
    ///
    /// Empty for an empty graph.
    #[inline]
    pub fn breadth_first(&self) -> BreadthFirst<'_, V, W, D> {
        BreadthFirst {
            graph: self,
            start: self.first_node(),
        }
    }

    /// Breadth-first view rooted at `start`. Empty if `start` is not in the graph.
    #[inline]
    pub fn breadth_first_from(&self, start: NodeIdx) -> BreadthFirst<'_, V, W, D> {
        BreadthFirst {
            graph: self,
            start: Some(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::graph::{DirectedGraph, Graph, WeightedGraph};
    use crate::ObjectManager;

    #[test]
    fn empty_graph_yields_nothing() {
        let graph: Graph<u8> = Graph::new(Arc::new(ObjectManager::new()));
        assert_eq!(graph.depth_first().steps().count(), 0);
        assert_eq!(graph.breadth_first().nodes().count(), 0);
    }

    #[test]
    fn walks_restart_on_every_call() {
        let mut graph = DirectedGraph::new(Arc::new(ObjectManager::new()));
        let a = graph.add_node('a');
        let b = graph.add_node('b');
        graph.connect(a, b).unwrap();

        let view = graph.breadth_first();
        let mut first = view.data();
        assert_eq!(first.next(), Some(&'a'));
        let again: String = view.data().collect();
        assert_eq!(again, "ab");
        assert_eq!(first.next(), Some(&'b'));
    }

    #[test]
    fn start_step_has_no_edge() {
        let mut graph = WeightedGraph::new(Arc::new(ObjectManager::new()));
        let a = graph.add_node(0);
        let b = graph.add_node_with(1, [(a, 2u8)]).unwrap();
        let steps: Vec<_> = graph.depth_first_from(b).steps().collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].edge, None);
        assert_eq!(steps[1].node, a);
        assert_eq!(graph.depth_first_from(b).edges().count(), 1);
    }

    #[test]
    fn parallel_edges_visit_a_node_once() {
        let mut graph = Graph::new(Arc::new(ObjectManager::new()));
        let a = graph.add_node(0);
        let b = graph.add_node(1);
        graph.connect(a, b).unwrap();
        graph.connect(b, a).unwrap();
        assert_eq!(graph.breadth_first().steps().count(), 2);
        assert_eq!(graph.depth_first().steps().count(), 2);
    }

    #[test]
    fn foreign_start_yields_nothing() {
        let manager = Arc::new(ObjectManager::new());
        let mut other = Graph::new(Arc::clone(&manager));
        let mut graph = Graph::new(manager);
        graph.add_node(0u8);
        let stranger = other.add_node(0u8);
        // Slot 0 is occupied in both graphs but by different instances.
        assert_eq!(graph.depth_first_from(stranger).steps().count(), 0);
    }
}
