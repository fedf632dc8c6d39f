use std::sync::Arc;

use anyhow::Result;
use recycle_graph::config::MAX_CAPACITY;
use recycle_graph::{
    ConfigError, GraphConfig, Node, ObjectManager, PoolConfig, WeightedGraph,
};

#[test]
fn test_pool_config_round_trips_through_json() -> Result<()> {
    let config = PoolConfig {
        initial_capacity: 32,
        max_recycled: Some(8),
    };
    let json = config.to_json()?;
    assert_eq!(PoolConfig::from_json(&json)?, config);
    Ok(())
}

#[test]
fn test_empty_documents_yield_defaults() -> Result<()> {
    assert_eq!(PoolConfig::from_json("{}")?, PoolConfig::default());
    assert_eq!(GraphConfig::from_json("{}")?, GraphConfig::default());
    Ok(())
}

#[test]
fn test_invalid_documents_are_reported() {
    assert!(matches!(
        PoolConfig::from_json("not json"),
        Err(ConfigError::Parse(_))
    ));

    let oversized = format!(r#"{{ "initial_capacity": {} }}"#, MAX_CAPACITY + 1);
    assert!(matches!(
        PoolConfig::from_json(&oversized),
        Err(ConfigError::Invalid(_))
    ));

    let wrong_type = r#"{ "edge_capacity": "many" }"#;
    assert!(matches!(
        GraphConfig::from_json(wrong_type),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_configured_manager_and_graph_work_together() -> Result<()> {
    let pool = PoolConfig::from_json(r#"{ "initial_capacity": 4, "max_recycled": 2 }"#)?;
    let arenas = GraphConfig::from_json(r#"{ "node_capacity": 16, "edge_capacity": 32 }"#)?;

    let manager = Arc::new(ObjectManager::with_config(pool));
    assert_eq!(manager.config().max_recycled, Some(2));

    let mut graph = WeightedGraph::with_config(Arc::clone(&manager), arenas);
    let root = graph.add_node(0u32);
    for i in 1..=4 {
        graph.add_node_with(i, [(root, i)])?;
    }
    graph.clear();

    // Only two destroyed nodes fit in the queue; the rest were dropped.
    let nodes = manager.stats::<Node<u32>>();
    assert_eq!(nodes.recycled, 2);
    assert_eq!(nodes.live, 0);
    Ok(())
}
