//! `ObjectManager` — a per-type object pool with stable instance identities.
//!
//! Each concrete Rust type gets its own sub-pool the first time it is requested.
//! A sub-pool holds a monotonic instance counter, the set of instance ids currently
//! out on loan, and a FIFO queue of destroyed instances awaiting reuse.
//!
//! # Concurrency
//! - The type-index table sits behind an `RwLock`; lookups after the first request
//!   for a type only take the read side.
//! - Each sub-pool's state sits behind its own `Mutex`, so id issuance and queue
//!   pushes/pops are mutually exclusive per type while distinct types never contend.
//! - Lifecycle hooks (`recycle`, `on_destroy`) and factories run outside the lock.
//!
//! # Memory
//! Sub-pools are never evicted and, unless [`PoolConfig::max_recycled`] says
//! otherwise, never shrink. Objects are retained at their high-water mark in
//! exchange for allocation-free reuse.

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crossbeam_utils::CachePadded;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::{InstanceId, ObjectId, Recyclable, TypeTag};
use crate::config::PoolConfig;
use crate::error::{invariant_violation, PoolError};

/// Snapshot of one sub-pool's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Tag of the pooled type.
    pub tag: TypeTag,
    /// Number of distinct instances ever fabricated.
    pub fabricated: u32,
    /// Instances currently on loan.
    pub live: usize,
    /// Destroyed instances waiting to be reissued.
    pub recycled: usize,
}

struct SubPoolState<T> {
    next_instance: InstanceId,
    live: HashSet<InstanceId>,
    recycled: VecDeque<T>,
}

struct SubPool<T> {
    tag: TypeTag,
    max_recycled: Option<usize>,
    state: CachePadded<Mutex<SubPoolState<T>>>,
}

impl<T: Recyclable> SubPool<T> {
    fn new(tag: TypeTag, config: &PoolConfig) -> Self {
        Self {
            tag,
            max_recycled: config.max_recycled,
            state: CachePadded::new(Mutex::new(SubPoolState {
                next_instance: 0,
                live: HashSet::with_capacity(config.initial_capacity),
                recycled: VecDeque::with_capacity(config.initial_capacity),
            })),
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, SubPoolState<T>> {
        // Every critical section leaves the state consistent, so a panic elsewhere
        // while holding the lock does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct TypeTable {
    tags: HashMap<TypeId, TypeTag>,
    pools: Vec<Arc<dyn Any + Send + Sync>>,
}

impl TypeTable {
    fn pool<T: Recyclable>(&self, tag: TypeTag) -> Arc<SubPool<T>> {
        match Arc::clone(&self.pools[tag.index()]).downcast::<SubPool<T>>() {
            Ok(pool) => pool,
            Err(_) => invariant_violation!(
                "type tag {tag} is registered for a type other than {}",
                type_name::<T>()
            ),
        }
    }
}

/// Thread-safe pool issuing and recycling [`Recyclable`] objects.
///
/// Usually shared through an `Arc` by every graph that draws from it.
pub struct ObjectManager {
    config: PoolConfig,
    types: RwLock<TypeTable>,
}

impl ObjectManager {
    /// Creates a manager with the default [`PoolConfig`].
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a manager with the given configuration.
    pub fn with_config(config: PoolConfig) -> Self {
        debug!(
            initial_capacity = config.initial_capacity,
            max_recycled = ?config.max_recycled,
            "initializing object manager"
        );
        Self {
            config,
            types: RwLock::new(TypeTable::default()),
        }
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the tag of `T`, registering a sub-pool for it if needed.
    pub fn type_tag<T: Recyclable>(&self) -> TypeTag {
        self.sub_pool::<T>().tag
    }

    /// Issues an instance of `T`.
    ///
    /// Reuses the oldest destroyed instance if one is queued, calling its
    /// [`Recyclable::recycle`] hook; otherwise builds one with `factory` and stamps
    /// it with the next unused instance id for `T`.
    ///
    /// # Panics
    /// Panics if `T` has exhausted its instance id space.
    pub fn create_or_recycle<T, F>(&self, factory: F) -> T
    where
        T: Recyclable,
        F: FnOnce() -> T,
    {
        let pool = self.sub_pool::<T>();
        let mut state = pool.lock();

        if let Some(mut object) = state.recycled.pop_front() {
            let id = object.id();
            state.live.insert(id.instance());
            drop(state);

            object.recycle();
            object.header_mut().revive();
            trace!(%id, "recycled instance");
            return object;
        }

        let instance = state.next_instance;
        state.next_instance = match instance.checked_add(1) {
            Some(next) => next,
            None => panic!("instance ids exhausted for {}", type_name::<T>()),
        };
        state.live.insert(instance);
        drop(state);

        let id = ObjectId::new(pool.tag, instance);
        let mut object = factory();
        object.header_mut().init(id);
        trace!(%id, "fabricated instance");
        object
    }

    /// Destroys `object` and queues it for reuse.
    ///
    /// Runs the [`Recyclable::on_destroy`] hook, marks the header destroyed and
    /// hands the instance to [`ObjectManager::prepare_for_recycling`].
    ///
    /// # Errors
    /// Same as [`ObjectManager::prepare_for_recycling`].
    pub fn destroy<T: Recyclable>(&self, mut object: T) -> Result<(), PoolError> {
        object.on_destroy();
        object.header_mut().mark_destroyed();
        self.prepare_for_recycling(object)
    }

    /// Queues an already destroyed instance for reuse.
    ///
    /// When the sub-pool is at its `max_recycled` cap the instance is dropped
    /// instead; its id is never issued again.
    ///
    /// # Errors
    /// - [`PoolError::InvalidState`] if `object` is not marked destroyed.
    /// - [`PoolError::TypeMismatch`] if its tag belongs to another type.
    /// - [`PoolError::NotIssued`] if this manager does not have it on loan.
    pub fn prepare_for_recycling<T: Recyclable>(&self, object: T) -> Result<(), PoolError> {
        let id = object.id();
        if !object.header().is_destroyed() {
            warn!(%id, "refusing to recycle a live object");
            return Err(PoolError::InvalidState(id));
        }

        let pool = self.sub_pool::<T>();
        if id.type_tag() != pool.tag {
            warn!(%id, expected = %pool.tag, "object handed to the wrong sub-pool");
            return Err(PoolError::TypeMismatch {
                id,
                expected: pool.tag,
            });
        }

        let mut state = pool.lock();
        if !state.live.remove(&id.instance()) {
            drop(state);
            warn!(%id, "object is not on loan from this manager");
            return Err(PoolError::NotIssued(id));
        }

        if pool
            .max_recycled
            .is_some_and(|cap| state.recycled.len() >= cap)
        {
            drop(state);
            trace!(%id, "recycle queue full, dropping instance");
            return Ok(());
        }

        state.recycled.push_back(object);
        Ok(())
    }

    /// Counters for `T`'s sub-pool.
    pub fn stats<T: Recyclable>(&self) -> PoolStats {
        let pool = self.sub_pool::<T>();
        let state = pool.lock();
        PoolStats {
            tag: pool.tag,
            fabricated: state.next_instance,
            live: state.live.len(),
            recycled: state.recycled.len(),
        }
    }

    /// Number of types registered so far.
    pub fn registered_types(&self) -> usize {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .pools
            .len()
    }

    fn sub_pool<T: Recyclable>(&self) -> Arc<SubPool<T>> {
        let key = TypeId::of::<T>();
        {
            let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(&tag) = types.tags.get(&key) {
                return types.pool::<T>(tag);
            }
        }

        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have registered `T` between the two locks.
        if let Some(&tag) = types.tags.get(&key) {
            return types.pool::<T>(tag);
        }

        let tag = match u16::try_from(types.pools.len()) {
            Ok(raw) if raw != TypeTag::UNASSIGNED.raw() => TypeTag::new(raw),
            _ => panic!("type tag space exhausted registering {}", type_name::<T>()),
        };
        let pool = Arc::new(SubPool::<T>::new(tag, &self.config));
        types.pools.push(Arc::clone(&pool) as Arc<dyn Any + Send + Sync>);
        types.tags.insert(key, tag);
        debug!(%tag, type_name = type_name::<T>(), "registered sub-pool");
        pool
    }
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ObjectManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectManager")
            .field("config", &self.config)
            .field("registered_types", &self.registered_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectHeader;

    #[derive(Default)]
    struct Probe {
        header: ObjectHeader,
        payload: Vec<u32>,
        recycled: u32,
    }

    impl Recyclable for Probe {
        fn header(&self) -> &ObjectHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut ObjectHeader {
            &mut self.header
        }

        fn recycle(&mut self) {
            self.payload.clear();
            self.recycled += 1;
        }

        fn on_destroy(&mut self) {
            self.payload.clear();
        }
    }

    #[derive(Default)]
    struct Other {
        header: ObjectHeader,
    }

    impl Recyclable for Other {
        fn header(&self) -> &ObjectHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut ObjectHeader {
            &mut self.header
        }
    }

    #[test]
    fn fresh_instances_get_sequential_ids() {
        let manager = ObjectManager::new();
        let a: Probe = manager.create_or_recycle(Probe::default);
        let b: Probe = manager.create_or_recycle(Probe::default);
        assert_eq!(a.id().instance(), 0);
        assert_eq!(b.id().instance(), 1);
        assert_eq!(a.id().type_tag(), b.id().type_tag());
    }

    #[test]
    fn destroyed_instance_is_reissued_with_same_identity() {
        let manager = ObjectManager::new();
        let mut probe: Probe = manager.create_or_recycle(Probe::default);
        probe.payload.extend([1, 2, 3]);
        let id = probe.id();

        manager.destroy(probe).unwrap();
        let again: Probe = manager.create_or_recycle(|| unreachable!("queue is not empty"));

        assert_eq!(again.id(), id);
        assert!(again.payload.is_empty());
        assert_eq!(again.recycled, 1);
        assert!(!again.header().is_destroyed());
    }

    #[test]
    fn distinct_types_get_distinct_tags() {
        let manager = ObjectManager::new();
        let probe_tag = manager.type_tag::<Probe>();
        let other_tag = manager.type_tag::<Other>();
        assert_ne!(probe_tag, other_tag);
        assert_eq!(manager.type_tag::<Probe>(), probe_tag);
        assert_eq!(manager.registered_types(), 2);
    }

    #[test]
    fn foreign_objects_are_rejected() {
        let manager = ObjectManager::new();
        let other_manager = ObjectManager::new();
        let probe: Probe = other_manager.create_or_recycle(Probe::default);
        let _ = manager.type_tag::<Probe>();

        let id = probe.id();
        assert_eq!(manager.destroy(probe), Err(PoolError::NotIssued(id)));
    }

    #[test]
    fn live_objects_cannot_skip_destroy() {
        let manager = ObjectManager::new();
        let probe: Probe = manager.create_or_recycle(Probe::default);
        let id = probe.id();
        assert_eq!(
            manager.prepare_for_recycling(probe),
            Err(PoolError::InvalidState(id))
        );
    }

    #[test]
    fn capped_queue_drops_overflow() {
        let manager = ObjectManager::with_config(PoolConfig {
            max_recycled: Some(1),
            ..PoolConfig::default()
        });
        let a: Probe = manager.create_or_recycle(Probe::default);
        let b: Probe = manager.create_or_recycle(Probe::default);
        manager.destroy(a).unwrap();
        manager.destroy(b).unwrap();

        let stats = manager.stats::<Probe>();
        assert_eq!(stats.fabricated, 2);
        assert_eq!(stats.live, 0);
        assert_eq!(stats.recycled, 1);
    }
}
