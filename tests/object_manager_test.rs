use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::thread;

use recycle_graph::{
    Edge, Graph, Node, ObjectHeader, ObjectManager, PoolConfig, PoolError, Recyclable,
};

#[derive(Default)]
struct Particle {
    header: ObjectHeader,
    trail: Vec<u32>,
}

impl Recyclable for Particle {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn recycle(&mut self) {
        self.trail.clear();
    }
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_recycled_instance_keeps_identity_and_is_reset() {
    let manager = ObjectManager::new();

    let mut particle = manager.create_or_recycle(Particle::default);
    particle.trail.extend([1, 2, 3]);
    let id = particle.id();
    manager.destroy(particle).unwrap();

    let again = manager.create_or_recycle(|| -> Particle { unreachable!("queue was not empty") });
    assert_eq!(again.id(), id);
    assert!(again.trail.is_empty());
    assert!(!again.header().is_destroyed());
}

#[test]
fn test_recycle_queue_is_first_in_first_out() {
    let manager = ObjectManager::new();
    let first = manager.create_or_recycle(Particle::default);
    let second = manager.create_or_recycle(Particle::default);
    let (first_id, second_id) = (first.id(), second.id());

    manager.destroy(second).unwrap();
    manager.destroy(first).unwrap();

    assert_eq!(manager.create_or_recycle(Particle::default).id(), second_id);
    assert_eq!(manager.create_or_recycle(Particle::default).id(), first_id);
}

#[test]
fn test_concurrent_fabrication_issues_dense_unique_ids() {
    const THREADS: u32 = 8;
    let manager = ObjectManager::new();

    let mut instances: Vec<u32> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| manager.create_or_recycle(Particle::default).id().instance()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    instances.sort_unstable();
    assert_eq!(instances, (0..THREADS).collect::<Vec<_>>());
}

#[test]
fn test_concurrent_recycling_never_double_issues() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 500;
    let manager = ObjectManager::new();
    let on_loan = Mutex::new(HashSet::new());

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..ROUNDS {
                    let particle = manager.create_or_recycle(Particle::default);
                    let id = particle.id();
                    assert!(on_loan.lock().unwrap().insert(id), "{id} issued twice");
                    on_loan.lock().unwrap().remove(&id);
                    manager.destroy(particle).unwrap();
                }
            });
        }
    });

    let stats = manager.stats::<Particle>();
    assert!(stats.fabricated as usize <= THREADS);
    assert_eq!(stats.live, 0);
    assert_eq!(stats.recycled, stats.fabricated as usize);
}

#[test]
fn test_identity_equality_and_hash_survive_recycling() {
    let manager = Arc::new(ObjectManager::new());
    let mut graph = Graph::new(Arc::clone(&manager));

    let a = graph.add_node("before");
    let before = graph.node(a).unwrap().id();
    graph.remove_node(a).unwrap();

    let b = graph.add_node("after");
    let after = graph.node(b).unwrap().id();

    assert_eq!(before, after);
    assert_eq!(hash_of(&before), hash_of(&after));
    assert_eq!(before.packed(), after.packed());
    assert_eq!(graph.data(b), Some(&"after"));
}

#[test]
fn test_distinct_types_get_distinct_tags() {
    let manager = ObjectManager::new();
    let node_tag = manager.type_tag::<Node<u8>>();
    let edge_tag = manager.type_tag::<Edge<()>>();
    let other_node_tag = manager.type_tag::<Node<u16>>();

    assert_ne!(node_tag, edge_tag);
    assert_ne!(node_tag, other_node_tag);
    assert_eq!(manager.type_tag::<Node<u8>>(), node_tag);
    assert_eq!(manager.registered_types(), 3);
}

#[test]
fn test_foreign_objects_are_rejected() {
    let issuer = ObjectManager::new();
    let stranger = ObjectManager::new();

    let particle = issuer.create_or_recycle(Particle::default);
    let id = particle.id();
    assert_eq!(stranger.destroy(particle), Err(PoolError::NotIssued(id)));
    assert_eq!(stranger.stats::<Particle>().recycled, 0);
}

#[test]
fn test_recycle_cap_drops_surplus() {
    let manager = ObjectManager::with_config(PoolConfig {
        max_recycled: Some(1),
        ..PoolConfig::default()
    });

    let a = manager.create_or_recycle(Particle::default);
    let b = manager.create_or_recycle(Particle::default);
    manager.destroy(a).unwrap();
    manager.destroy(b).unwrap();

    let stats = manager.stats::<Particle>();
    assert_eq!(stats.recycled, 1);
    assert_eq!(stats.live, 0);
    assert_eq!(stats.fabricated, 2);
}

#[test]
fn test_stats_serialize_to_json() {
    let manager = ObjectManager::new();
    let _keep = manager.create_or_recycle(Particle::default);
    let json = serde_json::to_value(manager.stats::<Particle>()).unwrap();
    assert_eq!(json["fabricated"], 1);
    assert_eq!(json["live"], 1);
    assert_eq!(json["recycled"], 0);
}
