//! The object pool.
//!
//! # Bookkeeping
//!
//! - `free`: per-archetype LIFO stack of inactive instances.
//! - `origins`: reverse map from every instance the pool ever created to
//!   its archetype, so a despawned instance goes back to the right stack.
//! - `issued`: instances currently handed out.
//!
//! The pool's total is `free + issued`. It never exceeds the capacity:
//! new instances are only created while the total is below the ceiling,
//! and reusing a free instance does not change the total.

use std::collections::{BTreeMap, BTreeSet};

use elfsim_types::{Archetype, InstanceId, Rotation, Vec3};
use tracing::{debug, warn};

use crate::error::PoolError;

/// Default global capacity ceiling.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// An instance the pool can recycle.
pub trait Poolable {
    /// Identity of this instance, stable across reuse.
    fn instance_id(&self) -> InstanceId;

    /// Place the instance and make it live.
    fn activate(&mut self, position: Vec3, rotation: Rotation);

    /// Take the instance out of play.
    fn deactivate(&mut self);

    /// Whether the instance is live.
    fn is_active(&self) -> bool;
}

/// Factory producing new instances of an archetype.
///
/// This is the hook into the visual layer: it returns `None` when the
/// archetype cannot be instantiated.
pub trait Instantiator {
    /// The instance type produced.
    type Instance: Poolable;

    /// Create a new, not-yet-active instance of `archetype`.
    fn instantiate(&mut self, archetype: &Archetype) -> Option<Self::Instance>;
}

/// Result of returning an instance to the pool.
#[derive(Debug, PartialEq, Eq)]
pub enum Despawned<T> {
    /// The instance is back on its archetype's free list.
    Pooled,
    /// The pool does not track this instance. It was deactivated and is
    /// handed back to the caller untouched otherwise.
    Untracked(T),
}

/// Capacity-bounded pool of recyclable instances, keyed by archetype.
#[derive(Debug)]
pub struct ObjectPool<I: Instantiator> {
    instantiator: I,
    capacity: usize,
    free: BTreeMap<Archetype, Vec<I::Instance>>,
    origins: BTreeMap<InstanceId, Archetype>,
    issued: BTreeSet<InstanceId>,
}

impl<I: Instantiator> ObjectPool<I> {
    /// Create an empty pool with the given capacity ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(instantiator: I, capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        Ok(Self {
            instantiator,
            capacity,
            free: BTreeMap::new(),
            origins: BTreeMap::new(),
            issued: BTreeSet::new(),
        })
    }

    /// Create an empty pool with [`DEFAULT_POOL_CAPACITY`].
    pub const fn with_default_capacity(instantiator: I) -> Self {
        Self {
            instantiator,
            capacity: DEFAULT_POOL_CAPACITY,
            free: BTreeMap::new(),
            origins: BTreeMap::new(),
            issued: BTreeSet::new(),
        }
    }

    /// Hand out a live instance of `archetype` at `position`.
    ///
    /// Reuses a free instance when one exists, otherwise creates one if the
    /// pool is below capacity. Returns `None` when capacity is exhausted or
    /// the instantiator fails; both are logged as warnings.
    pub fn spawn(
        &mut self,
        archetype: &Archetype,
        position: Vec3,
        rotation: Rotation,
    ) -> Option<I::Instance> {
        let reused = self.free.get_mut(archetype).and_then(Vec::pop);
        let mut instance = match reused {
            Some(instance) => instance,
            None => self.create(archetype)?,
        };

        self.issued.insert(instance.instance_id());
        instance.activate(position, rotation);
        Some(instance)
    }

    /// Return an instance to the pool.
    ///
    /// The instance is always deactivated. Tracked instances go onto their
    /// archetype's free list; anything else is handed back.
    pub fn despawn(&mut self, mut instance: I::Instance) -> Despawned<I::Instance> {
        instance.deactivate();
        let id = instance.instance_id();

        if !self.issued.contains(&id) {
            debug!(instance_id = %id, "Despawn of instance not issued by this pool");
            return Despawned::Untracked(instance);
        }
        let Some(archetype) = self.origins.get(&id) else {
            debug!(instance_id = %id, "Despawn of instance with unknown archetype");
            return Despawned::Untracked(instance);
        };

        self.issued.remove(&id);
        self.free.entry(archetype.clone()).or_default().push(instance);
        Despawned::Pooled
    }

    /// Permanently forget an issued instance, freeing its capacity slot.
    ///
    /// Returns `false` if the instance was not issued by this pool.
    pub fn retire(&mut self, id: InstanceId) -> bool {
        if self.issued.remove(&id) {
            self.origins.remove(&id);
            debug!(instance_id = %id, "Pooled instance retired");
            true
        } else {
            false
        }
    }

    /// Pre-create up to `count` inactive instances of `archetype`, bounded
    /// by the remaining capacity. Returns how many were created.
    pub fn warmup(&mut self, archetype: &Archetype, count: usize) -> usize {
        if count == 0 {
            return 0;
        }

        let room = self.capacity.saturating_sub(self.total());
        let target = count.min(room);
        let mut created: usize = 0;

        while created < target {
            let Some(mut instance) = self.instantiator.instantiate(archetype) else {
                warn!(archetype = %archetype, created, "Warmup stopped: archetype cannot be instantiated");
                break;
            };
            instance.deactivate();
            self.origins.insert(instance.instance_id(), archetype.clone());
            self.free.entry(archetype.clone()).or_default().push(instance);
            created = created.saturating_add(1);
        }

        if target < count {
            debug!(
                archetype = %archetype,
                requested = count,
                created,
                capacity = self.capacity,
                "Warmup truncated by pool capacity"
            );
        }
        created
    }

    /// Total instances owned by the pool: free plus issued.
    pub fn total(&self) -> usize {
        self.free_total().saturating_add(self.issued.len())
    }

    /// Inactive instances across all archetypes.
    pub fn free_total(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Inactive instances of one archetype.
    pub fn free_count(&self, archetype: &Archetype) -> usize {
        self.free.get(archetype).map_or(0, Vec::len)
    }

    /// Instances currently handed out.
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    /// The capacity ceiling.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `id` is currently issued by this pool.
    pub fn is_tracked(&self, id: InstanceId) -> bool {
        self.issued.contains(&id)
    }

    /// Archetype the pool created `id` from, if it did.
    pub fn archetype_of(&self, id: InstanceId) -> Option<&Archetype> {
        self.origins.get(&id)
    }

    /// The instantiator.
    pub const fn instantiator(&self) -> &I {
        &self.instantiator
    }

    /// The instantiator, mutably.
    pub const fn instantiator_mut(&mut self) -> &mut I {
        &mut self.instantiator
    }

    fn create(&mut self, archetype: &Archetype) -> Option<I::Instance> {
        if self.total() >= self.capacity {
            warn!(
                archetype = %archetype,
                capacity = self.capacity,
                "Pool capacity reached, cannot spawn more instances"
            );
            return None;
        }
        let Some(instance) = self.instantiator.instantiate(archetype) else {
            warn!(archetype = %archetype, "Instantiator failed to create instance");
            return None;
        };
        self.origins.insert(instance.instance_id(), archetype.clone());
        Some(instance)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::BTreeSet;

    use super::*;

    /// Minimal pooled instance.
    #[derive(Debug, PartialEq, Eq)]
    pub(crate) struct Dummy {
        pub(crate) id: InstanceId,
        pub(crate) active: bool,
        pub(crate) placed_at: Option<(i64, i64)>,
    }

    impl Poolable for Dummy {
        fn instance_id(&self) -> InstanceId {
            self.id
        }

        #[allow(clippy::cast_possible_truncation)]
        fn activate(&mut self, position: Vec3, _rotation: Rotation) {
            self.active = true;
            self.placed_at = Some((position.x as i64, position.z as i64));
        }

        fn deactivate(&mut self) {
            self.active = false;
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    /// Instantiator that counts creations and refuses listed archetypes.
    #[derive(Debug, Default)]
    pub(crate) struct CountingFactory {
        pub(crate) created: usize,
        pub(crate) refuse: BTreeSet<Archetype>,
    }

    impl Instantiator for CountingFactory {
        type Instance = Dummy;

        fn instantiate(&mut self, archetype: &Archetype) -> Option<Dummy> {
            if self.refuse.contains(archetype) {
                return None;
            }
            self.created = self.created.saturating_add(1);
            Some(Dummy {
                id: InstanceId::new(),
                active: false,
                placed_at: None,
            })
        }
    }

    fn pool(capacity: usize) -> ObjectPool<CountingFactory> {
        ObjectPool::new(CountingFactory::default(), capacity).unwrap()
    }

    fn elf() -> Archetype {
        Archetype::from("elf.red")
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            ObjectPool::new(CountingFactory::default(), 0),
            Err(PoolError::ZeroCapacity)
        ));
    }

    #[test]
    fn spawn_creates_when_empty() {
        let mut pool = pool(10);
        let instance = pool.spawn(&elf(), Vec3::new(3.0, 0.0, 4.0), Rotation::IDENTITY).unwrap();
        assert!(instance.active);
        assert_eq!(instance.placed_at, Some((3, 4)));
        assert_eq!(pool.instantiator().created, 1);
        assert_eq!(pool.issued_count(), 1);
        assert_eq!(pool.total(), 1);
    }

    #[test]
    fn spawn_despawn_spawn_reuses_instance() {
        let mut pool = pool(DEFAULT_POOL_CAPACITY);
        let first = pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).unwrap();
        let first_id = first.id;

        assert_eq!(pool.despawn(first), Despawned::Pooled);
        assert_eq!(pool.free_count(&elf()), 1);

        let second = pool.spawn(&elf(), Vec3::new(1.0, 0.0, 1.0), Rotation::IDENTITY).unwrap();
        assert_eq!(second.id, first_id);
        assert!(second.active);
        assert_eq!(pool.instantiator().created, 1);
    }

    #[test]
    fn capacity_exhaustion_returns_none() {
        let capacity = 3;
        let mut pool = pool(capacity);
        let mut live = Vec::new();
        for _ in 0..capacity {
            live.push(pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).unwrap());
        }
        assert!(pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).is_none());
        assert_eq!(pool.total(), capacity);
        assert_eq!(pool.instantiator().created, capacity);
    }

    #[test]
    fn capacity_is_shared_across_archetypes() {
        let mut pool = pool(2);
        let fx = Archetype::from("fx.explosion");
        let _a = pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).unwrap();
        let b = pool.spawn(&fx, Vec3::ZERO, Rotation::IDENTITY).unwrap();
        assert!(pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).is_none());

        // A free fx instance does not help an elf spawn.
        let _ = pool.despawn(b);
        assert!(pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).is_none());
        assert!(pool.spawn(&fx, Vec3::ZERO, Rotation::IDENTITY).is_some());
    }

    #[test]
    fn despawn_routes_to_origin_archetype() {
        let mut pool = pool(10);
        let fx = Archetype::from("fx.spawn");
        let a = pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).unwrap();
        let b = pool.spawn(&fx, Vec3::ZERO, Rotation::IDENTITY).unwrap();
        let _ = pool.despawn(b);
        let _ = pool.despawn(a);
        assert_eq!(pool.free_count(&elf()), 1);
        assert_eq!(pool.free_count(&fx), 1);
    }

    #[test]
    fn unknown_instance_is_deactivated_not_enqueued() {
        let mut pool = pool(10);
        let stranger = Dummy {
            id: InstanceId::new(),
            active: true,
            placed_at: None,
        };
        match pool.despawn(stranger) {
            Despawned::Untracked(returned) => assert!(!returned.active),
            Despawned::Pooled => unreachable!("stranger must not be pooled"),
        }
        assert_eq!(pool.free_total(), 0);
        assert_eq!(pool.total(), 0);
    }

    #[test]
    fn double_despawn_does_not_duplicate() {
        let mut pool = pool(10);
        let a = pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).unwrap();
        let clone = Dummy {
            id: a.id,
            active: true,
            placed_at: None,
        };
        assert_eq!(pool.despawn(a), Despawned::Pooled);
        assert!(matches!(pool.despawn(clone), Despawned::Untracked(_)));
        assert_eq!(pool.free_count(&elf()), 1);
    }

    #[test]
    fn warmup_creates_inactive_instances() {
        let mut pool = pool(10);
        assert_eq!(pool.warmup(&elf(), 5), 5);
        assert_eq!(pool.free_count(&elf()), 5);
        assert_eq!(pool.issued_count(), 0);

        // Spawning now reuses a warmed instance.
        let instance = pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).unwrap();
        assert!(instance.active);
        assert_eq!(pool.instantiator().created, 5);
    }

    #[test]
    fn warmup_bounded_by_remaining_capacity() {
        let mut pool = pool(4);
        let _live = pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).unwrap();
        assert_eq!(pool.warmup(&elf(), 10), 3);
        assert_eq!(pool.total(), 4);
    }

    #[test]
    fn warmup_zero_or_unknown_archetype_creates_nothing() {
        let mut pool = pool(10);
        assert_eq!(pool.warmup(&elf(), 0), 0);

        let missing = Archetype::from("missing");
        pool.instantiator_mut().refuse.insert(missing.clone());
        assert_eq!(pool.warmup(&missing, 5), 0);
        assert!(pool.spawn(&missing, Vec3::ZERO, Rotation::IDENTITY).is_none());
        assert_eq!(pool.total(), 0);
    }

    #[test]
    fn retire_frees_capacity() {
        let mut pool = pool(1);
        let a = pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).unwrap();
        assert!(pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).is_none());
        assert!(pool.retire(a.id));
        assert!(!pool.retire(a.id));
        assert!(pool.archetype_of(a.id).is_none());
        assert!(pool.spawn(&elf(), Vec3::ZERO, Rotation::IDENTITY).is_some());
    }
}
