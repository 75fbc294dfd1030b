//! The simulated world and its per-tick cycle.
//!
//! [`World`] owns every live object, the shared pool, the collision
//! resolver (with the cooldown gate and the spawner registry), and the
//! clock. [`World::step`] runs one fixed-delta tick:
//!
//! 1. Advance the clock, the cooldown gate, and every spawner timer.
//! 2. Return expired corpses and effects to the pool.
//! 3. Update elf controllers and integrate their bodies.
//! 4. Detect newly entered contacts and resolve each pair once.
//! 5. Fulfil the spawn orders produced by spawners.

use std::collections::BTreeMap;

use elfsim_agents::{AgentConfig, Elf, ElfController};
use elfsim_core::config::WorldConfig;
use elfsim_core::{
    CollisionResolver, ContactPair, IntervalSpawner, OverlapTracker, SimClock, SimulationConfig,
    SpawnCooldownGate, SpawnOrder, SpawnerRegistry,
};
use elfsim_pool::{Despawned, ExpiryQueue, ObjectPool, Poolable};
use elfsim_types::{ElfColor, ElfId, ElfProfile, InstanceId, Rotation, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::body::{KinematicBody, clamp_to_square};
use crate::error::EngineError;
use crate::objects::{EffectKind, ElfSlot, WorldFactory, WorldObject};

/// Counters and population figures after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    /// The tick that just ran.
    pub tick: u64,
    /// Simulated seconds since start.
    pub elapsed_secs: f64,
    /// Elves in play that are not dead.
    pub alive: usize,
    /// Elves currently stunned.
    pub stunned: usize,
    /// Dead elves waiting to be despawned.
    pub dead: usize,
    /// Elves placed this tick.
    pub spawned: u32,
    /// Spawn orders the pool could not serve this tick.
    pub spawn_failures: u32,
    /// Collisions that granted a bonus spawn this tick.
    pub duplicates: u32,
    /// Pairs destroyed this tick.
    pub explosions: u32,
    /// Instances the pool tracks, free or issued.
    pub pool_total: usize,
    /// Instances waiting on free lists.
    pub pool_free: usize,
    /// Instances currently in play.
    pub pool_issued: usize,
    /// Effects currently playing.
    pub active_effects: usize,
    /// Instances ever created by the factory.
    pub pool_created: u64,
}

/// Running totals since the world was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorldTotals {
    /// Elves placed.
    pub spawned: u64,
    /// Spawn orders that failed.
    pub spawn_failures: u64,
    /// Pairs destroyed.
    pub explosions: u64,
}

/// Tunables copied out of [`WorldConfig`].
#[derive(Debug, Clone, Copy)]
struct WorldSettings {
    half_extent: f32,
    contact_radius: f32,
    grace_secs: f32,
    death_despawn_secs: f32,
    effect_lifetime_secs: f32,
}

impl From<&WorldConfig> for WorldSettings {
    fn from(config: &WorldConfig) -> Self {
        Self {
            half_extent: config.half_extent,
            contact_radius: config.contact_radius.max(0.0),
            grace_secs: config.collision_grace_secs.max(0.0),
            death_despawn_secs: config.death_despawn_secs.max(0.0),
            effect_lifetime_secs: config.effect_lifetime_secs.max(0.0),
        }
    }
}

/// Per-tick counters gathered while stepping.
#[derive(Debug, Default)]
struct StepCounters {
    spawned: u32,
    spawn_failures: u32,
    duplicates: u32,
    explosions: u32,
}

/// The whole simulated world.
#[derive(Debug)]
pub struct World {
    clock: SimClock,
    pool: ObjectPool<WorldFactory>,
    resolver: CollisionResolver,
    elves: BTreeMap<ElfId, WorldObject>,
    effects: BTreeMap<InstanceId, WorldObject>,
    corpses: ExpiryQueue<ElfId>,
    effect_expiry: ExpiryQueue<InstanceId>,
    overlaps: OverlapTracker,
    agents: AgentConfig,
    rng: StdRng,
    settings: WorldSettings,
    totals: WorldTotals,
}

impl World {
    /// Build a world from a validated configuration.
    ///
    /// Warms the pool, creates one spawner per configured color, and starts
    /// the ones marked `autostart`. Their first elves are placed on the
    /// first [`step`](Self::step).
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the configuration is invalid or any
    /// subsystem rejects its settings.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let clock = SimClock::new(config.world.delta_secs)?;
        let mut pool = ObjectPool::new(WorldFactory::default(), config.pool.capacity)?;
        let report = config.pool.warmup.apply(&mut pool);
        debug!(
            requested = report.requested,
            created = report.created,
            skipped = report.skipped,
            "Pool warmed"
        );

        let mut rng = StdRng::seed_from_u64(config.world.seed);
        let mut registry = SpawnerRegistry::new();
        for spawner_config in &config.spawning.spawners {
            let mut spawner = IntervalSpawner::new(
                spawner_config.color,
                spawner_config.position,
                spawner_config.radius,
                config.spawning.rate_table.clone(),
                spawner_config.rate_index,
                StdRng::seed_from_u64(rng.random()),
            )?;
            if spawner_config.autostart {
                spawner.start();
            }
            registry.register(Box::new(spawner));
        }

        let gate = SpawnCooldownGate::new(config.collision.cooldown_secs);
        let resolver = CollisionResolver::with_default_policy(gate, registry);

        info!(
            spawners = resolver.registry().len(),
            pool_capacity = pool.capacity(),
            cooldown_secs = resolver.gate().duration(),
            seed = config.world.seed,
            "World created"
        );

        Ok(Self {
            clock,
            pool,
            resolver,
            elves: BTreeMap::new(),
            effects: BTreeMap::new(),
            corpses: ExpiryQueue::new(),
            effect_expiry: ExpiryQueue::new(),
            overlaps: OverlapTracker::new(),
            agents: config.agents.clone(),
            rng,
            settings: WorldSettings::from(&config.world),
            totals: WorldTotals::default(),
        })
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] if the tick counter overflows.
    pub fn step(&mut self) -> Result<TickSummary, EngineError> {
        let tick = self.clock.advance()?;
        let delta = self.clock.delta_secs();
        let mut counters = StepCounters::default();

        self.resolver.advance(delta);
        self.resolver.registry_mut().tick_all(delta);

        self.expire(delta);
        self.update_elves(delta);

        let entered = self.detect_contacts();
        for pair in entered {
            self.resolve_pair(pair, &mut counters);
        }

        let orders = self.resolver.registry_mut().drain_orders();
        for order in orders {
            self.fulfil(&order, &mut counters);
        }

        self.totals.spawned = self.totals.spawned.saturating_add(u64::from(counters.spawned));
        self.totals.spawn_failures = self
            .totals
            .spawn_failures
            .saturating_add(u64::from(counters.spawn_failures));
        self.totals.explosions = self
            .totals
            .explosions
            .saturating_add(u64::from(counters.explosions));

        let summary = self.summary(tick, &counters);
        debug!(
            tick,
            alive = summary.alive,
            dead = summary.dead,
            spawned = summary.spawned,
            explosions = summary.explosions,
            "Tick complete"
        );
        Ok(summary)
    }

    /// Place a new elf of `color` near `position`.
    ///
    /// The position is clamped into the world. Returns `None` if the pool
    /// is exhausted or the elf could not be built.
    pub fn spawn_elf(&mut self, color: ElfColor, position: Vec3) -> Option<ElfId> {
        let profile = ElfProfile::for_color(color);
        let position = clamp_to_square(position, self.settings.half_extent);
        let mut object = self
            .pool
            .spawn(&profile.archetype, position, Rotation::IDENTITY)?;

        let body = KinematicBody::new(position, profile.speed, self.settings.half_extent);
        let rng = StdRng::seed_from_u64(self.rng.random());
        let controller = match ElfController::new(Elf::new(profile), body, &self.agents, rng) {
            Ok(controller) => controller,
            Err(e) => {
                warn!(color = %color, error = %e, "Elf could not be built");
                self.return_to_pool(object);
                return None;
            }
        };

        let id = controller.id();
        object.elf = Some(ElfSlot {
            controller,
            grace_remaining: self.settings.grace_secs,
        });
        self.elves.insert(id, object);
        self.play_effect(EffectKind::Spawn, position);
        debug!(elf_id = %id, color = %color, "Elf spawned");
        Some(id)
    }

    /// The controller of elf `id`, if it is in play.
    pub fn elf(&self, id: ElfId) -> Option<&ElfController<KinematicBody>> {
        self.elves
            .get(&id)
            .and_then(|object| object.elf.as_ref())
            .map(|slot| &slot.controller)
    }

    /// Every elf in play, dead ones included, in id order.
    pub fn elves(&self) -> impl Iterator<Item = &ElfController<KinematicBody>> + '_ {
        self.elves
            .values()
            .filter_map(|object| object.elf.as_ref())
            .map(|slot| &slot.controller)
    }

    /// Number of elves in play that are not dead.
    pub fn alive_count(&self) -> usize {
        self.elves().filter(|c| !c.is_dead()).count()
    }

    /// The collision resolver, with its gate and registry.
    pub const fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    /// The collision resolver, mutably.
    pub const fn resolver_mut(&mut self) -> &mut CollisionResolver {
        &mut self.resolver
    }

    /// The shared object pool.
    pub const fn pool(&self) -> &ObjectPool<WorldFactory> {
        &self.pool
    }

    /// The simulation clock.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Running totals.
    pub const fn totals(&self) -> WorldTotals {
        self.totals
    }

    fn expire(&mut self, delta: f32) {
        for id in self.corpses.tick(delta) {
            self.overlaps.forget(id);
            if let Some(object) = self.elves.remove(&id) {
                debug!(elf_id = %id, "Corpse despawned");
                self.return_to_pool(object);
            }
        }
        for id in self.effect_expiry.tick(delta) {
            if let Some(object) = self.effects.remove(&id) {
                self.return_to_pool(object);
            }
        }
    }

    fn update_elves(&mut self, delta: f32) {
        for slot in self.elves.values_mut().filter_map(|o| o.elf.as_mut()) {
            slot.controller.update(delta);
            slot.controller.handle_mut().integrate(delta);
            slot.grace_remaining = (slot.grace_remaining - delta).max(0.0);
        }
    }

    /// Pairs that came within contact range this tick.
    fn detect_contacts(&mut self) -> Vec<ContactPair> {
        let candidates: Vec<(ElfId, Vec3)> = self
            .elves
            .iter()
            .filter_map(|(id, object)| {
                let slot = object.elf.as_ref()?;
                let eligible = !slot.controller.is_dead() && slot.grace_remaining <= 0.0;
                eligible.then(|| (*id, slot.controller.position()))
            })
            .collect();

        let mut touching = Vec::new();
        let mut rest = candidates.as_slice();
        while let Some(((a, pa), tail)) = rest.split_first() {
            for (b, pb) in tail {
                if pa.distance(*pb) <= self.settings.contact_radius {
                    touching.extend(ContactPair::new(*a, *b));
                }
            }
            rest = tail;
        }

        self.overlaps.update(touching)
    }

    fn resolve_pair(&mut self, pair: ContactPair, counters: &mut StepCounters) {
        let Some(mut first) = self.elves.remove(&pair.low()) else {
            return;
        };

        let mut blast = None;
        let mut meeting = None;
        let second = self
            .elves
            .get_mut(&pair.high())
            .and_then(|object| object.elf.as_mut());
        if let (Some(a), Some(b)) = (first.elf.as_mut(), second) {
            let result = self
                .resolver
                .process_collision(&mut a.controller, &mut b.controller);
            if result.should_duplicate {
                counters.duplicates = counters.duplicates.saturating_add(1);
                meeting = Some((a.controller.position() + b.controller.position()) * 0.5);
            }
            if result.should_destroy_both {
                detonate(a);
                detonate(b);
                blast = Some((a.controller.position() + b.controller.position()) * 0.5);
            }
        }
        self.elves.insert(pair.low(), first);

        if let Some(point) = meeting {
            self.play_effect(EffectKind::Collision, point);
            info!(first = %pair.low(), second = %pair.high(), "Bonus elf requested");
        }
        if let Some(point) = blast {
            counters.explosions = counters.explosions.saturating_add(1);
            self.corpses.schedule(pair.low(), self.settings.death_despawn_secs);
            self.corpses.schedule(pair.high(), self.settings.death_despawn_secs);
            self.play_effect(EffectKind::Explosion, point);
            info!(first = %pair.low(), second = %pair.high(), "Elves exploded");
        }
    }

    fn fulfil(&mut self, order: &SpawnOrder, counters: &mut StepCounters) {
        if self.spawn_elf(order.color, order.position).is_some() {
            counters.spawned = counters.spawned.saturating_add(1);
        } else {
            counters.spawn_failures = counters.spawn_failures.saturating_add(1);
            warn!(
                color = %order.color,
                spawner_id = %order.spawner,
                trigger = ?order.trigger,
                "Spawn order dropped"
            );
        }
    }

    fn play_effect(&mut self, kind: EffectKind, position: Vec3) {
        let Some(object) = self
            .pool
            .spawn(&kind.archetype(), position, Rotation::IDENTITY)
        else {
            debug!(effect = ?kind, "No room for effect");
            return;
        };
        let id = object.instance_id();
        self.effects.insert(id, object);
        self.effect_expiry.schedule(id, self.settings.effect_lifetime_secs);
    }

    fn return_to_pool(&mut self, object: WorldObject) {
        if let Despawned::Untracked(object) = self.pool.despawn(object) {
            warn!(kind = ?object.kind(), "Object was not issued by the pool");
        }
    }

    fn summary(&self, tick: u64, counters: &StepCounters) -> TickSummary {
        let (mut alive, mut stunned, mut dead) = (0_usize, 0_usize, 0_usize);
        for controller in self.elves() {
            if controller.is_dead() {
                dead = dead.saturating_add(1);
            } else {
                alive = alive.saturating_add(1);
                if controller.is_stunned() {
                    stunned = stunned.saturating_add(1);
                }
            }
        }

        TickSummary {
            tick,
            elapsed_secs: self.clock.elapsed_secs(),
            alive,
            stunned,
            dead,
            spawned: counters.spawned,
            spawn_failures: counters.spawn_failures,
            duplicates: counters.duplicates,
            explosions: counters.explosions,
            pool_total: self.pool.total(),
            pool_free: self.pool.free_total(),
            pool_issued: self.pool.issued_count(),
            active_effects: self.effects.len(),
            pool_created: self.pool.instantiator().created(),
        }
    }
}

/// Kill an elf and take its body out of play.
fn detonate(slot: &mut ElfSlot) {
    slot.controller.kill();
    slot.controller.handle_mut().set_enabled(false);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elfsim_core::config::SpawnerConfig;

    use super::*;
    use crate::objects::ObjectKind;

    /// A quiet world: no spawners, no grace, short corpse and effect lives.
    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.spawning.spawners.clear();
        config.world.collision_grace_secs = 0.0;
        config.world.death_despawn_secs = 0.1;
        config.world.effect_lifetime_secs = 0.1;
        config
    }

    /// One stopped spawner of `color`, away from the origin, that still
    /// honours requests.
    fn with_idle_spawner(mut config: SimulationConfig, color: ElfColor) -> SimulationConfig {
        let mut spawner = SpawnerConfig::new(color, Vec3::new(10.0, 0.0, 10.0));
        spawner.autostart = false;
        spawner.rate_index = 0;
        config.spawning.spawners.push(spawner);
        config
    }

    #[test]
    fn autostarted_spawners_place_one_elf_each_on_first_tick() {
        let mut world = World::from_config(&SimulationConfig::default()).unwrap();
        let summary = world.step().unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.spawned, 4);
        assert_eq!(summary.alive, 4);
        let colors: Vec<_> = world.elves().map(ElfController::color).collect();
        for color in ElfColor::ALL {
            assert!(colors.contains(&color));
        }
    }

    #[test]
    fn same_color_contact_requests_bonus_elf() {
        let config = with_idle_spawner(quiet_config(), ElfColor::Red);
        let mut world = World::from_config(&config).unwrap();
        world.spawn_elf(ElfColor::Red, Vec3::ZERO).unwrap();
        world.spawn_elf(ElfColor::Red, Vec3::new(0.2, 0.0, 0.0)).unwrap();

        let summary = world.step().unwrap();
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.alive, 3);
        assert_eq!(summary.stunned, 2);
        assert!(!world.resolver().gate().can_spawn());
        let flashes = world
            .effects
            .values()
            .filter(|object| object.kind() == ObjectKind::Effect(EffectKind::Collision))
            .count();
        assert_eq!(flashes, 1);
    }

    #[test]
    fn contact_resolves_once_while_pair_stays_in_range() {
        let config = with_idle_spawner(quiet_config(), ElfColor::Blue);
        let mut world = World::from_config(&config).unwrap();
        world.spawn_elf(ElfColor::Blue, Vec3::ZERO).unwrap();
        world.spawn_elf(ElfColor::Blue, Vec3::new(0.1, 0.0, 0.0)).unwrap();

        world.step().unwrap();
        let second = world.step().unwrap();
        assert_eq!(second.duplicates, 0);
        assert_eq!(world.resolver().stats().collisions, 1);
    }

    #[test]
    fn different_colors_explode_and_are_despawned_later() {
        let mut world = World::from_config(&quiet_config()).unwrap();
        let red = world.spawn_elf(ElfColor::Red, Vec3::ZERO).unwrap();
        let blue = world.spawn_elf(ElfColor::Blue, Vec3::new(0.3, 0.0, 0.0)).unwrap();

        let summary = world.step().unwrap();
        assert_eq!(summary.explosions, 1);
        assert_eq!(summary.dead, 2);
        assert_eq!(summary.alive, 0);
        assert!(world.elf(red).unwrap().is_dead());
        assert!(world.elf(blue).unwrap().is_dead());

        // Corpses live 0.1s, five 0.02s ticks.
        for _ in 0..6 {
            world.step().unwrap();
        }
        assert!(world.elf(red).is_none());
        assert!(world.elf(blue).is_none());
        assert_eq!(world.pool().issued_count(), 0);
        assert_eq!(world.totals().explosions, 1);
    }

    #[test]
    fn grace_period_keeps_new_elves_apart() {
        let mut config = quiet_config();
        config.world.collision_grace_secs = 1.0;
        let mut world = World::from_config(&config).unwrap();
        world.spawn_elf(ElfColor::Red, Vec3::ZERO).unwrap();
        world.spawn_elf(ElfColor::Black, Vec3::ZERO).unwrap();

        let summary = world.step().unwrap();
        assert_eq!(summary.explosions, 0);
        assert_eq!(world.resolver().stats().collisions, 0);
    }

    #[test]
    fn exhausted_pool_drops_spawn_orders() {
        let mut config = SimulationConfig::default();
        config.pool.capacity = 2;
        let mut world = World::from_config(&config).unwrap();

        let summary = world.step().unwrap();
        // The first elf takes one slot and its spawn effect the other.
        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.spawn_failures, 3);
        assert_eq!(summary.pool_total, 2);
        assert_eq!(world.totals().spawn_failures, 3);
    }

    #[test]
    fn despawned_instances_are_reused() {
        let mut world = World::from_config(&quiet_config()).unwrap();
        world.spawn_elf(ElfColor::White, Vec3::new(-5.0, 0.0, 0.0)).unwrap();
        world.spawn_elf(ElfColor::Black, Vec3::new(-5.0, 0.0, 0.1)).unwrap();
        for _ in 0..10 {
            world.step().unwrap();
        }
        let created = world.pool().instantiator().created();

        world.spawn_elf(ElfColor::White, Vec3::new(5.0, 0.0, 5.0)).unwrap();
        assert_eq!(world.pool().instantiator().created(), created);
    }

    #[test]
    fn spawn_positions_are_clamped_into_world() {
        let mut world = World::from_config(&quiet_config()).unwrap();
        let id = world.spawn_elf(ElfColor::Red, Vec3::new(100.0, 0.0, -100.0)).unwrap();
        let position = world.elf(id).unwrap().position();
        assert!((position.x - 25.0).abs() < f32::EPSILON);
        assert!((position.z + 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn summary_serializes_to_json() {
        let mut world = World::from_config(&SimulationConfig::default()).unwrap();
        let summary = world.step().unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json.get("tick"), Some(&serde_json::json!(1)));
        assert_eq!(json.get("spawned"), Some(&serde_json::json!(4)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SimulationConfig::default();
        config.pool.capacity = 0;
        assert!(matches!(
            World::from_config(&config),
            Err(EngineError::Config { .. })
        ));
    }
}
