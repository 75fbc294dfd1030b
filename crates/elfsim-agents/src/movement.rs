//! Movement handle seam and wander behavior.
//!
//! The movement layer itself (navigation, steering, physics) is external:
//! it is reached through the [`MovementHandle`] trait. [`WanderBehavior`]
//! wraps a handle and adds what the lifecycle needs on top of it: halting,
//! resuming with a fresh target, and changing direction on a randomized
//! cadence while the elf is free to move.

use elfsim_types::{Vec3, WanderInterval};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::config::AgentConfig;
use crate::lifecycle::MotionControl;

/// Handle to an elf's body in the movement layer.
///
/// Implementations must tolerate every call while disabled; the wander
/// behavior checks [`is_enabled`](Self::is_enabled) first anyway.
pub trait MovementHandle {
    /// Whether the handle currently accepts movement commands.
    fn is_enabled(&self) -> bool;

    /// Halt velocity and clear any pending destination.
    fn stop(&mut self);

    /// Un-halt. Does not choose a destination by itself.
    fn resume(&mut self);

    /// Current speed in units per second.
    fn velocity_magnitude(&self) -> f32;

    /// Move instantly to `position`. Returns `false` if the position was
    /// rejected.
    fn teleport(&mut self, position: Vec3) -> bool;

    /// Start moving towards `target`. Returns `false` if no path exists.
    fn set_destination(&mut self, target: Vec3) -> bool;

    /// Current position.
    fn position(&self) -> Vec3;

    /// Project `candidate` onto the walkable surface, searching no farther
    /// than `max_distance`. `None` means nothing walkable is nearby.
    ///
    /// The default treats every point as walkable.
    fn sample_walkable(&self, candidate: Vec3, _max_distance: f32) -> Option<Vec3> {
        Some(candidate)
    }
}

/// Randomized wandering on top of a [`MovementHandle`].
#[derive(Debug)]
pub struct WanderBehavior<M> {
    handle: M,
    interval: WanderInterval,
    radius: f32,
    attempts: u32,
    since_change: f32,
    next_change: f32,
    rng: StdRng,
}

impl<M: MovementHandle> WanderBehavior<M> {
    /// Wrap `handle`. The first direction change is scheduled immediately.
    pub fn new(handle: M, interval: WanderInterval, config: &AgentConfig, rng: StdRng) -> Self {
        let mut behavior = Self {
            handle,
            interval,
            radius: config.wander_radius,
            attempts: config.wander_attempts,
            since_change: 0.0,
            next_change: 0.0,
            rng,
        };
        behavior.reset_timer();
        behavior
    }

    /// The wrapped handle.
    pub const fn handle(&self) -> &M {
        &self.handle
    }

    /// The wrapped handle, mutably.
    pub const fn handle_mut(&mut self) -> &mut M {
        &mut self.handle
    }

    /// Give the handle back.
    pub fn into_handle(self) -> M {
        self.handle
    }

    /// Current speed; zero while the handle is disabled.
    pub fn current_speed(&self) -> f32 {
        if self.handle.is_enabled() {
            self.handle.velocity_magnitude()
        } else {
            0.0
        }
    }

    /// Seconds until the next scheduled direction change.
    pub fn time_to_direction_change(&self) -> f32 {
        (self.next_change - self.since_change).max(0.0)
    }

    /// Choose a random walkable point around the current position and head
    /// there. Returns `false` if no candidate was walkable or the handle
    /// refused the destination.
    pub fn pick_new_destination(&mut self) -> bool {
        if !self.handle.is_enabled() {
            return false;
        }
        let center = self.handle.position();
        for _ in 0..self.attempts {
            let angle = self.rng.random_range(0.0..core::f32::consts::TAU);
            let distance = self.radius * self.rng.random::<f32>().sqrt();
            let candidate =
                center.offset_horizontal(distance * angle.cos(), distance * angle.sin());
            if let Some(target) = self.handle.sample_walkable(candidate, self.radius) {
                return self.handle.set_destination(target);
            }
        }
        debug!(
            x = center.x,
            z = center.z,
            attempts = self.attempts,
            "No walkable wander target found"
        );
        false
    }

    fn reset_timer(&mut self) {
        self.since_change = 0.0;
        let WanderInterval { min_secs, max_secs } = self.interval;
        self.next_change = if max_secs > min_secs {
            self.rng.random_range(min_secs..=max_secs)
        } else {
            min_secs
        };
    }
}

impl<M: MovementHandle> MotionControl for WanderBehavior<M> {
    fn stop(&mut self) {
        if self.handle.is_enabled() {
            self.handle.stop();
        }
    }

    fn resume(&mut self) {
        if self.handle.is_enabled() {
            self.handle.resume();
            self.pick_new_destination();
            self.reset_timer();
        }
    }

    fn advance(&mut self, delta: f32) {
        self.since_change += delta;
        if self.since_change >= self.next_change {
            self.pick_new_destination();
            self.reset_timer();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::SeedableRng;

    use super::*;

    /// In-memory handle recording every command it receives.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingHandle {
        pub(crate) disabled: bool,
        pub(crate) stopped: bool,
        pub(crate) position: Vec3,
        pub(crate) destination: Option<Vec3>,
        pub(crate) speed: f32,
        pub(crate) stop_calls: u32,
        pub(crate) resume_calls: u32,
        pub(crate) destinations_set: u32,
        pub(crate) walkable: bool,
    }

    impl RecordingHandle {
        pub(crate) fn walkable() -> Self {
            Self {
                walkable: true,
                ..Self::default()
            }
        }
    }

    impl MovementHandle for RecordingHandle {
        fn is_enabled(&self) -> bool {
            !self.disabled
        }

        fn stop(&mut self) {
            self.stop_calls = self.stop_calls.saturating_add(1);
            self.stopped = true;
            self.destination = None;
            self.speed = 0.0;
        }

        fn resume(&mut self) {
            self.resume_calls = self.resume_calls.saturating_add(1);
            self.stopped = false;
        }

        fn velocity_magnitude(&self) -> f32 {
            self.speed
        }

        fn teleport(&mut self, position: Vec3) -> bool {
            self.position = position;
            true
        }

        fn set_destination(&mut self, target: Vec3) -> bool {
            self.destinations_set = self.destinations_set.saturating_add(1);
            self.destination = Some(target);
            if !self.stopped {
                self.speed = 1.0;
            }
            true
        }

        fn position(&self) -> Vec3 {
            self.position
        }

        fn sample_walkable(&self, candidate: Vec3, _max_distance: f32) -> Option<Vec3> {
            self.walkable.then_some(candidate)
        }
    }

    fn behavior(handle: RecordingHandle, interval: WanderInterval) -> WanderBehavior<RecordingHandle> {
        WanderBehavior::new(
            handle,
            interval,
            &AgentConfig::default(),
            StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn resume_picks_destination_within_radius() {
        let mut wander = behavior(RecordingHandle::walkable(), WanderInterval::default());
        wander.resume();
        assert_eq!(wander.handle().resume_calls, 1);
        let target = wander.handle().destination;
        assert!(target.is_some());
        let dist = target.unwrap_or(Vec3::ZERO).distance(Vec3::ZERO);
        assert!(dist <= AgentConfig::default().wander_radius + 1e-3);
    }

    #[test]
    fn stop_clears_destination() {
        let mut wander = behavior(RecordingHandle::walkable(), WanderInterval::default());
        wander.resume();
        wander.stop();
        assert!(wander.handle().stopped);
        assert!(wander.handle().destination.is_none());
        assert!(wander.current_speed() < f32::EPSILON);
    }

    #[test]
    fn disabled_handle_ignores_commands() {
        let handle = RecordingHandle {
            disabled: true,
            speed: 5.0,
            ..RecordingHandle::walkable()
        };
        let mut wander = behavior(handle, WanderInterval::default());
        wander.stop();
        wander.resume();
        assert_eq!(wander.handle().stop_calls, 0);
        assert_eq!(wander.handle().resume_calls, 0);
        assert!(wander.current_speed() < f32::EPSILON);
        assert!(!wander.pick_new_destination());
    }

    #[test]
    fn direction_changes_on_cadence() {
        let mut wander = behavior(RecordingHandle::walkable(), WanderInterval::new(1.0, 1.0));
        wander.advance(0.6);
        assert_eq!(wander.handle().destinations_set, 0);
        wander.advance(0.6);
        assert_eq!(wander.handle().destinations_set, 1);
        // Timer restarted after the change.
        assert!((wander.time_to_direction_change() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn unwalkable_surroundings_give_up() {
        let mut wander = behavior(RecordingHandle::default(), WanderInterval::default());
        assert!(!wander.pick_new_destination());
        assert_eq!(wander.handle().destinations_set, 0);
    }
}
