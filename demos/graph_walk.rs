//! Builds a small directed weighted graph, prints its shape and walks it.
//!
//! Run with `cargo run --example graph_walk`.

use std::sync::Arc;

use recycle_graph::{DirectedWeightedGraph, GraphError, Link, ObjectManager};

fn main() -> Result<(), GraphError> {
    let manager = Arc::new(ObjectManager::new());
    let mut graph = DirectedWeightedGraph::<&str, u32>::create(&manager);

    let node1 = graph.add_node("Node 1");
    let node2 = graph.add_node_with_incoming(
        "Node 2",
        Vec::<Link<u32>>::new(),
        [Link::new(node1, 19)],
    )?;
    let node3 = graph.add_node_with_incoming(
        "Node 3",
        [Link::new(node2, 12)],
        [Link::new(node1, 1)],
    )?;
    graph.add_node_with_incoming("Node 4", [Link::new(node1, 42)], [Link::new(node3, 4)])?;

    for node in graph.nodes() {
        println!(
            "{} - outgoing: {}, incoming: {}",
            node.data(),
            node.outgoing_edges().len(),
            node.incoming_edges().len()
        );
    }

    for edge in graph.edges() {
        if let Some((source, destination)) = edge.endpoints() {
            println!(
                "Edge from {} to {} with weight {}",
                graph.data(source).copied().unwrap_or("?"),
                graph.data(destination).copied().unwrap_or("?"),
                edge.weight()
            );
        }
    }

    println!("depth-first from {}:", graph.data(node1).copied().unwrap_or("?"));
    graph.depth_first_search(node1, |node| {
        println!("  {}", node.data());
        false
    });

    graph.destroy()?;
    let nodes = manager.stats::<recycle_graph::Node<&str>>();
    println!(
        "after destroy: {} nodes fabricated, {} queued for reuse",
        nodes.fabricated, nodes.recycled
    );
    Ok(())
}
