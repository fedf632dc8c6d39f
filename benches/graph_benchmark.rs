use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recycle_graph::{DirectedGraph, GraphConfig, NodeIdx, ObjectManager, WeightedGraph};

const SIZE: usize = 1000;

fn chain(manager: &Arc<ObjectManager>) -> (DirectedGraph<usize>, Vec<NodeIdx>) {
    let mut graph = DirectedGraph::with_config(
        Arc::clone(manager),
        GraphConfig {
            node_capacity: SIZE,
            edge_capacity: SIZE,
        },
    );
    let nodes: Vec<_> = (0..SIZE).map(|i| graph.add_node(i)).collect();
    for pair in nodes.windows(2) {
        graph.connect(pair[0], pair[1]).unwrap();
    }
    (graph, nodes)
}

fn bench_graph_rebuild(c: &mut Criterion) {
    let manager = Arc::new(ObjectManager::new());

    c.bench_function("pool_graph_rebuild_recycled", |b| {
        b.iter(|| {
            let (mut graph, _) = chain(&manager);
            black_box(graph.edge_count());
            graph.clear();
        });
    });

    c.bench_function("pool_graph_sparse_remove", |b| {
        b.iter(|| {
            let (mut graph, nodes) = chain(&manager);
            black_box(graph.remove_node(nodes[SIZE / 2]).unwrap());
            graph.clear();
        });
    });
}

fn bench_graph_walks(c: &mut Criterion) {
    let manager = Arc::new(ObjectManager::new());
    let mut graph = WeightedGraph::new(Arc::clone(&manager));
    let nodes: Vec<_> = (0..SIZE).map(|i| graph.add_node(i)).collect();
    // Binary tree with weights that force neighbor sorting.
    for i in 1..SIZE {
        graph.add_edge(nodes[(i - 1) / 2], nodes[i], (i * 7919 % 101) as u32).unwrap();
    }

    c.bench_function("weighted_graph_bfs", |b| {
        b.iter(|| black_box(graph.breadth_first().steps().count()));
    });

    c.bench_function("weighted_graph_dfs", |b| {
        b.iter(|| black_box(graph.depth_first().steps().count()));
    });

    c.bench_function("weighted_graph_bfs_search_miss", |b| {
        b.iter(|| black_box(graph.breadth_first_search(nodes[0], |n| *n.data() == SIZE)));
    });
}

criterion_group!(benches, bench_graph_rebuild, bench_graph_walks);
criterion_main!(benches);
