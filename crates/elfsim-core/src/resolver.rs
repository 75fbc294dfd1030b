//! Collision resolution.
//!
//! [`CollisionResolver`] turns one contact between two elves into state
//! changes and at most one bonus spawn. It owns the services a collision
//! touches (policy, cooldown gate, spawner registry) and is the only place
//! they are combined.
//!
//! # Ordering
//!
//! Within one resolution the steps always run in this order:
//!
//! 1. Dead-state of both elves is sampled.
//! 2. Both elves are stunned, dead or not.
//! 3. The decision is computed (forced to neither if either was dead).
//! 4. On duplicate, the gated spawn is dispatched.
//! 5. The result is returned; killing on destroy is the caller's job.

use elfsim_agents::{CollisionDecision, CollisionPolicy, ColorMatchPolicy, ElfController, MovementHandle};
use elfsim_types::ElfColor;
use serde::Serialize;
use tracing::{debug, trace};

use crate::cooldown::SpawnCooldownGate;
use crate::registry::SpawnerRegistry;

/// What a collision needs from each participant.
pub trait Collidable {
    /// Color of the participant, `None` if it cannot be determined.
    fn collision_color(&self) -> Option<ElfColor>;

    /// Whether the participant is dead.
    fn is_dead(&self) -> bool;

    /// Stun the participant. Must be a no-op on the dead.
    fn apply_stun(&mut self);
}

impl<M: MovementHandle> Collidable for ElfController<M> {
    fn collision_color(&self) -> Option<ElfColor> {
        Some(self.color())
    }

    fn is_dead(&self) -> bool {
        Self::is_dead(self)
    }

    fn apply_stun(&mut self) {
        Self::apply_stun(self);
    }
}

/// Outcome of one collision, consumed by the caller to choreograph
/// effects. At most one flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollisionResult {
    /// A bonus elf was dispatched.
    pub should_duplicate: bool,
    /// Both elves must be killed.
    pub should_destroy_both: bool,
}

impl CollisionResult {
    /// Whether nothing beyond the stun happened.
    pub const fn is_noop(&self) -> bool {
        !self.should_duplicate && !self.should_destroy_both
    }
}

/// Running counters kept by the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    /// Collisions processed.
    pub collisions: u64,
    /// Bonus spawns dispatched.
    pub duplicates: u64,
    /// Pairs told to destroy each other.
    pub destroyed_pairs: u64,
    /// Duplicates refused by the cooldown gate.
    pub denied_by_cooldown: u64,
    /// Duplicates refused for lack of a willing spawner.
    pub missing_spawner: u64,
    /// Collisions involving an already-dead elf.
    pub involving_dead: u64,
}

/// Orchestrates collisions between elves.
#[derive(Debug)]
pub struct CollisionResolver<P = ColorMatchPolicy> {
    policy: P,
    gate: SpawnCooldownGate,
    registry: SpawnerRegistry,
    stats: ResolverStats,
}

impl CollisionResolver<ColorMatchPolicy> {
    /// Resolver using the color-match rule.
    pub fn with_default_policy(gate: SpawnCooldownGate, registry: SpawnerRegistry) -> Self {
        Self::new(ColorMatchPolicy, gate, registry)
    }
}

impl<P: CollisionPolicy> CollisionResolver<P> {
    /// Build a resolver from its collaborators.
    pub fn new(policy: P, gate: SpawnCooldownGate, registry: SpawnerRegistry) -> Self {
        Self {
            policy,
            gate,
            registry,
            stats: ResolverStats::default(),
        }
    }

    /// Resolve one collision between `a` and `b`.
    pub fn process_collision<A, B>(&mut self, a: &mut A, b: &mut B) -> CollisionResult
    where
        A: Collidable + ?Sized,
        B: Collidable + ?Sized,
    {
        self.stats.collisions = self.stats.collisions.saturating_add(1);

        let either_dead = a.is_dead() || b.is_dead();
        a.apply_stun();
        b.apply_stun();

        let (color_a, color_b) = (a.collision_color(), b.collision_color());
        let decision = if either_dead {
            self.stats.involving_dead = self.stats.involving_dead.saturating_add(1);
            CollisionDecision::Neither
        } else {
            self.policy.decide(color_a, color_b)
        };
        trace!(?color_a, ?color_b, %decision, either_dead, "Collision decided");

        let mut result = CollisionResult::default();
        match decision {
            CollisionDecision::Duplicate => {
                if let Some(color) = color_a.or(color_b) {
                    result.should_duplicate = self.try_bonus_spawn(color);
                }
            }
            CollisionDecision::DestroyBoth => {
                self.stats.destroyed_pairs = self.stats.destroyed_pairs.saturating_add(1);
                result.should_destroy_both = true;
            }
            CollisionDecision::Neither => {}
        }
        result
    }

    /// Move the cooldown gate forward by one tick.
    pub fn advance(&mut self, delta: f32) {
        self.gate.advance(delta);
    }

    /// The cooldown gate.
    pub const fn gate(&self) -> &SpawnCooldownGate {
        &self.gate
    }

    /// The spawner registry.
    pub const fn registry(&self) -> &SpawnerRegistry {
        &self.registry
    }

    /// The spawner registry, mutably.
    pub const fn registry_mut(&mut self) -> &mut SpawnerRegistry {
        &mut self.registry
    }

    /// The collision policy.
    pub const fn policy(&self) -> &P {
        &self.policy
    }

    /// Counters since construction.
    pub const fn stats(&self) -> ResolverStats {
        self.stats
    }

    fn try_bonus_spawn(&mut self, color: ElfColor) -> bool {
        if !self.gate.can_spawn() {
            self.stats.denied_by_cooldown = self.stats.denied_by_cooldown.saturating_add(1);
            debug!(
                color = %color,
                remaining = self.gate.remaining_cooldown(),
                "Bonus spawn denied by cooldown"
            );
            return false;
        }
        if !self.registry.request_spawn(color) {
            self.stats.missing_spawner = self.stats.missing_spawner.saturating_add(1);
            return false;
        }
        self.gate.register_spawn();
        self.stats.duplicates = self.stats.duplicates.saturating_add(1);
        debug!(color = %color, "Bonus spawn dispatched");
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::registry::tests::CountingSpawner;

    /// Participant recording how often it was stunned.
    #[derive(Debug)]
    struct Dummy {
        color: Option<ElfColor>,
        dead: bool,
        stuns: u32,
    }

    impl Dummy {
        const fn new(color: Option<ElfColor>) -> Self {
            Self {
                color,
                dead: false,
                stuns: 0,
            }
        }
    }

    impl Collidable for Dummy {
        fn collision_color(&self) -> Option<ElfColor> {
            self.color
        }

        fn is_dead(&self) -> bool {
            self.dead
        }

        fn apply_stun(&mut self) {
            self.stuns = self.stuns.saturating_add(1);
        }
    }

    /// Policy that never duplicates.
    struct AlwaysDestroy;

    impl CollisionPolicy for AlwaysDestroy {
        fn decide(&self, _a: Option<ElfColor>, _b: Option<ElfColor>) -> CollisionDecision {
            CollisionDecision::DestroyBoth
        }
    }

    fn resolver_with_red() -> (CollisionResolver, std::sync::Arc<std::sync::atomic::AtomicU32>) {
        let mut registry = SpawnerRegistry::new();
        let (red, calls) = CountingSpawner::new(ElfColor::Red);
        registry.register(Box::new(red));
        (
            CollisionResolver::with_default_policy(SpawnCooldownGate::new(3.0), registry),
            calls,
        )
    }

    #[test]
    fn missing_color_only_stuns() {
        let (mut resolver, calls) = resolver_with_red();
        let mut a = Dummy::new(None);
        let mut b = Dummy::new(Some(ElfColor::Red));
        let result = resolver.process_collision(&mut a, &mut b);
        assert!(result.is_noop());
        assert_eq!((a.stuns, b.stuns), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_without_spawner_leaves_gate_open() {
        let (mut resolver, _) = resolver_with_red();
        let mut a = Dummy::new(Some(ElfColor::Blue));
        let mut b = Dummy::new(Some(ElfColor::Blue));
        let result = resolver.process_collision(&mut a, &mut b);
        assert!(!result.should_duplicate);
        assert!(resolver.gate().can_spawn());
        assert_eq!(resolver.stats().missing_spawner, 1);
    }

    #[test]
    fn at_most_one_spawn_per_window() {
        let (mut resolver, calls) = resolver_with_red();
        for _ in 0..5 {
            let mut a = Dummy::new(Some(ElfColor::Red));
            let mut b = Dummy::new(Some(ElfColor::Red));
            resolver.process_collision(&mut a, &mut b);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.stats().denied_by_cooldown, 4);

        resolver.advance(3.0);
        let mut a = Dummy::new(Some(ElfColor::Red));
        let mut b = Dummy::new(Some(ElfColor::Red));
        assert!(resolver.process_collision(&mut a, &mut b).should_duplicate);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn custom_policy_is_honoured() {
        let mut resolver = CollisionResolver::new(
            AlwaysDestroy,
            SpawnCooldownGate::new(0.0),
            SpawnerRegistry::new(),
        );
        let mut a = Dummy::new(Some(ElfColor::White));
        let mut b = Dummy::new(Some(ElfColor::White));
        let result = resolver.process_collision(&mut a, &mut b);
        assert!(result.should_destroy_both);
        assert!(!result.should_duplicate);
    }

    #[test]
    fn result_serializes_flags() {
        let json = serde_json::to_value(CollisionResult {
            should_duplicate: true,
            should_destroy_both: false,
        })
        .unwrap();
        assert_eq!(json["should_duplicate"], true);
        assert_eq!(json["should_destroy_both"], false);
    }
}
