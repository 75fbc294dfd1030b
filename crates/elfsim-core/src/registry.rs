//! Color-keyed spawner registry.
//!
//! Each color has at most one spawner. The registry owns its spawners and
//! dispatches spawn requests by color; a color with no spawner is an
//! ordinary runtime state, not an error.

use std::collections::BTreeMap;

use elfsim_types::{ElfColor, SpawnerId};
use tracing::{debug, info};

use crate::spawner::SpawnOrder;

/// A producer of elves of one color.
pub trait Spawner: Send {
    /// Stable identity of this spawner.
    fn id(&self) -> SpawnerId;

    /// Color of the elves this spawner produces.
    fn color(&self) -> ElfColor;

    /// Request one elf. Returns `true` if the spawner accepted the request.
    fn spawn(&mut self) -> bool;

    /// Advance the spawner's own schedule by `delta` seconds.
    fn tick(&mut self, _delta: f32) {}

    /// Drain the spawn orders produced since the last call.
    fn take_orders(&mut self) -> Vec<SpawnOrder> {
        Vec::new()
    }
}

/// Registry mapping each color to its spawner.
#[derive(Default)]
pub struct SpawnerRegistry {
    spawners: BTreeMap<ElfColor, Box<dyn Spawner>>,
}

impl core::fmt::Debug for SpawnerRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.spawners.iter().map(|(color, s)| (color, s.id())))
            .finish()
    }
}

impl SpawnerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spawner` under its color.
    ///
    /// A color holds one spawner: registering again for the same color
    /// replaces the entry, and the displaced spawner is returned.
    /// Re-registering the same spawner therefore never duplicates it.
    pub fn register(&mut self, spawner: Box<dyn Spawner>) -> Option<Box<dyn Spawner>> {
        let color = spawner.color();
        let id = spawner.id();
        let previous = self.spawners.insert(color, spawner);
        match previous.as_ref() {
            Some(old) if old.id() != id => {
                info!(color = %color, spawner_id = %id, replaced = %old.id(), "Spawner replaced");
            }
            Some(_) => debug!(color = %color, spawner_id = %id, "Spawner re-registered"),
            None => info!(color = %color, spawner_id = %id, "Spawner registered"),
        }
        previous
    }

    /// Remove the spawner with identity `id`, returning it.
    ///
    /// Another spawner that has since taken over the same color is left
    /// in place.
    pub fn unregister(&mut self, id: SpawnerId) -> Option<Box<dyn Spawner>> {
        let color = self
            .spawners
            .iter()
            .find_map(|(color, s)| (s.id() == id).then_some(*color))?;
        let removed = self.spawners.remove(&color);
        info!(color = %color, spawner_id = %id, "Spawner unregistered");
        removed
    }

    /// The spawner for `color`, if any.
    pub fn get_spawner(&self, color: ElfColor) -> Option<&dyn Spawner> {
        self.spawners.get(&color).map(AsRef::as_ref)
    }

    /// The spawner for `color`, mutably.
    pub fn get_spawner_mut(&mut self, color: ElfColor) -> Option<&mut (dyn Spawner + 'static)> {
        self.spawners.get_mut(&color).map(AsMut::as_mut)
    }

    /// Ask the spawner for `color` to produce one elf.
    ///
    /// Returns `false` if no spawner serves that color or the spawner
    /// declined.
    pub fn request_spawn(&mut self, color: ElfColor) -> bool {
        let Some(spawner) = self.spawners.get_mut(&color) else {
            debug!(color = %color, "No spawner registered for color");
            return false;
        };
        spawner.spawn()
    }

    /// Advance every spawner's schedule by `delta` seconds.
    pub fn tick_all(&mut self, delta: f32) {
        for spawner in self.spawners.values_mut() {
            spawner.tick(delta);
        }
    }

    /// Collect the pending orders of every spawner, in color order.
    pub fn drain_orders(&mut self) -> Vec<SpawnOrder> {
        self.spawners
            .values_mut()
            .flat_map(|spawner| spawner.take_orders())
            .collect()
    }

    /// Colors that currently have a spawner.
    pub fn colors(&self) -> impl Iterator<Item = ElfColor> + '_ {
        self.spawners.keys().copied()
    }

    /// Number of registered spawners.
    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    /// Whether no spawner is registered.
    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Spawner counting `spawn` calls through a shared counter.
    #[derive(Debug)]
    pub(crate) struct CountingSpawner {
        pub(crate) id: SpawnerId,
        pub(crate) color: ElfColor,
        pub(crate) calls: Arc<AtomicU32>,
        pub(crate) accept: bool,
    }

    impl CountingSpawner {
        pub(crate) fn new(color: ElfColor) -> (Self, Arc<AtomicU32>) {
            let calls = Arc::new(AtomicU32::new(0));
            let spawner = Self {
                id: SpawnerId::new(),
                color,
                calls: Arc::clone(&calls),
                accept: true,
            };
            (spawner, calls)
        }
    }

    impl Spawner for CountingSpawner {
        fn id(&self) -> SpawnerId {
            self.id
        }

        fn color(&self) -> ElfColor {
            self.color
        }

        fn spawn(&mut self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.accept
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = SpawnerRegistry::new();
        let (spawner, _) = CountingSpawner::new(ElfColor::Red);
        let id = spawner.id;
        assert!(registry.register(Box::new(spawner)).is_none());
        assert_eq!(registry.get_spawner(ElfColor::Red).map(Spawner::id), Some(id));
        assert!(registry.get_spawner(ElfColor::Blue).is_none());
    }

    #[test]
    fn same_spawner_twice_is_one_entry() {
        let mut registry = SpawnerRegistry::new();
        let (spawner, calls) = CountingSpawner::new(ElfColor::Red);
        let id = spawner.id;
        registry.register(Box::new(spawner));
        let again = CountingSpawner {
            id,
            color: ElfColor::Red,
            calls,
            accept: true,
        };
        assert!(registry.register(Box::new(again)).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn request_dispatches_to_matching_color() {
        let mut registry = SpawnerRegistry::new();
        let (red, red_calls) = CountingSpawner::new(ElfColor::Red);
        let (blue, blue_calls) = CountingSpawner::new(ElfColor::Blue);
        registry.register(Box::new(red));
        registry.register(Box::new(blue));

        assert!(registry.request_spawn(ElfColor::Red));
        assert_eq!(red_calls.load(Ordering::SeqCst), 1);
        assert_eq!(blue_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_color_reports_false() {
        let mut registry = SpawnerRegistry::new();
        assert!(!registry.request_spawn(ElfColor::White));
    }

    #[test]
    fn declined_spawn_reports_false() {
        let mut registry = SpawnerRegistry::new();
        let (mut spawner, calls) = CountingSpawner::new(ElfColor::Black);
        spawner.accept = false;
        registry.register(Box::new(spawner));
        assert!(!registry.request_spawn(ElfColor::Black));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregister_by_identity() {
        let mut registry = SpawnerRegistry::new();
        let (first, _) = CountingSpawner::new(ElfColor::Red);
        let first_id = first.id;
        let (second, _) = CountingSpawner::new(ElfColor::Red);
        let second_id = second.id;
        registry.register(Box::new(first));
        registry.register(Box::new(second));

        // The displaced spawner is no longer registered.
        assert!(registry.unregister(first_id).is_none());
        assert!(registry.unregister(second_id).is_some());
        assert!(registry.get_spawner(ElfColor::Red).is_none());
        assert!(registry.is_empty());
    }
}
