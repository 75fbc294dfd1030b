//! Per-elf controller tying identity, lifecycle, and movement together.
//!
//! The controller is the only owner of an elf's lifecycle. The movement
//! layer keeps its own body and is driven exclusively through the wrapped
//! [`MovementHandle`].

use elfsim_types::{ElfColor, ElfId, ElfProfile, LifecyclePhase, Vec3};
use rand::rngs::StdRng;
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::lifecycle::{Lifecycle, LifecycleState, MotionControl};
use crate::movement::{MovementHandle, WanderBehavior};

/// Identity and static profile of one elf.
#[derive(Debug, Clone, PartialEq)]
pub struct Elf {
    id: ElfId,
    profile: ElfProfile,
}

impl Elf {
    /// Create an elf with a fresh identity.
    pub fn new(profile: ElfProfile) -> Self {
        Self {
            id: ElfId::new(),
            profile,
        }
    }

    /// Create an elf with a known identity.
    pub const fn with_id(id: ElfId, profile: ElfProfile) -> Self {
        Self { id, profile }
    }

    /// The elf's identity.
    pub const fn id(&self) -> ElfId {
        self.id
    }

    /// The elf's color.
    pub const fn color(&self) -> ElfColor {
        self.profile.color
    }

    /// The profile the elf was spawned from.
    pub const fn profile(&self) -> &ElfProfile {
        &self.profile
    }
}

/// Controller for one live elf.
#[derive(Debug)]
pub struct ElfController<M> {
    elf: Elf,
    lifecycle: Lifecycle,
    movement: WanderBehavior<M>,
    moving_threshold: f32,
}

impl<M: MovementHandle> ElfController<M> {
    /// Build a controller and start the elf wandering.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] or
    /// [`AgentError::InvalidProfile`] if either contains unusable values.
    pub fn new(elf: Elf, handle: M, config: &AgentConfig, rng: StdRng) -> Result<Self, AgentError> {
        config.validate()?;
        validate_profile(elf.profile())?;

        let mut movement = WanderBehavior::new(handle, elf.profile().wander_interval, config, rng);
        // Entering the Normal state starts movement.
        movement.resume();

        debug!(elf_id = %elf.id(), color = %elf.color(), "Elf controller created");

        Ok(Self {
            elf,
            lifecycle: Lifecycle::new(),
            movement,
            moving_threshold: config.moving_speed_threshold,
        })
    }

    /// The elf this controller drives.
    pub const fn elf(&self) -> &Elf {
        &self.elf
    }

    /// The elf's identity.
    pub const fn id(&self) -> ElfId {
        self.elf.id()
    }

    /// The elf's color.
    pub const fn color(&self) -> ElfColor {
        self.elf.color()
    }

    /// Full lifecycle state.
    pub const fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }

    /// Whether the elf is dead.
    pub const fn is_dead(&self) -> bool {
        self.lifecycle.is_dead()
    }

    /// Whether the elf is stunned.
    pub const fn is_stunned(&self) -> bool {
        self.lifecycle.is_stunned()
    }

    /// Seconds left in the current stun, if stunned.
    pub const fn stun_remaining(&self) -> Option<f32> {
        self.lifecycle.stun_remaining()
    }

    /// Whether the body is currently moving faster than the threshold.
    pub fn is_moving(&self) -> bool {
        self.movement.current_speed() > self.moving_threshold
    }

    /// Advance one tick.
    pub fn update(&mut self, delta: f32) -> LifecyclePhase {
        self.lifecycle.update(delta, &mut self.movement)
    }

    /// Stun the elf (no-op when dead).
    pub fn apply_stun(&mut self) -> LifecyclePhase {
        self.lifecycle.apply_stun(&mut self.movement)
    }

    /// Kill the elf (idempotent).
    pub fn kill(&mut self) -> LifecyclePhase {
        let phase = self.lifecycle.kill(&mut self.movement);
        debug!(elf_id = %self.elf.id(), color = %self.elf.color(), "Elf killed");
        phase
    }

    /// Current position of the body.
    pub fn position(&self) -> Vec3 {
        self.movement.handle().position()
    }

    /// Move the body instantly, keeping the lifecycle untouched.
    pub fn teleport(&mut self, position: Vec3) -> bool {
        self.movement.handle_mut().teleport(position)
    }

    /// The wander behavior driving the body.
    pub const fn movement(&self) -> &WanderBehavior<M> {
        &self.movement
    }

    /// The movement handle.
    pub const fn handle(&self) -> &M {
        self.movement.handle()
    }

    /// The movement handle, mutably.
    pub const fn handle_mut(&mut self) -> &mut M {
        self.movement.handle_mut()
    }

    /// Tear down the controller and give the movement handle back.
    pub fn into_handle(mut self) -> M {
        if !self.lifecycle.is_dead() {
            self.movement.stop();
        }
        self.movement.into_handle()
    }
}

fn validate_profile(profile: &ElfProfile) -> Result<(), AgentError> {
    let invalid = |reason: String| AgentError::InvalidProfile {
        color: profile.color,
        reason,
    };
    if !profile.speed.is_finite() || profile.speed < 0.0 {
        return Err(invalid(format!("speed must be non-negative, got {}", profile.speed)));
    }
    let interval = profile.wander_interval;
    if !interval.min_secs.is_finite() || !interval.max_secs.is_finite() || interval.min_secs < 0.0 {
        return Err(invalid(format!(
            "wander interval must be a finite non-negative range, got [{}, {}]",
            interval.min_secs, interval.max_secs
        )));
    }
    if interval.max_secs < interval.min_secs {
        return Err(invalid(format!(
            "wander interval max {} is below min {}",
            interval.max_secs, interval.min_secs
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elfsim_types::WanderInterval;
    use rand::SeedableRng;

    use super::*;
    use crate::movement::tests::RecordingHandle;

    fn controller(color: ElfColor) -> ElfController<RecordingHandle> {
        ElfController::new(
            Elf::new(ElfProfile::for_color(color)),
            RecordingHandle::walkable(),
            &AgentConfig::default(),
            StdRng::seed_from_u64(11),
        )
        .unwrap()
    }

    #[test]
    fn new_controller_starts_moving() {
        let ctrl = controller(ElfColor::Red);
        assert_eq!(ctrl.phase(), LifecyclePhase::Normal);
        assert_eq!(ctrl.handle().resume_calls, 1);
        assert!(ctrl.handle().destination.is_some());
        assert!(ctrl.is_moving());
    }

    #[test]
    fn stun_freezes_then_recovers_once() {
        let mut ctrl = controller(ElfColor::Blue);
        let resumes_before = ctrl.handle().resume_calls;

        ctrl.apply_stun();
        assert!(ctrl.is_stunned());
        assert!(!ctrl.is_moving());

        ctrl.update(0.3);
        assert!(ctrl.is_stunned());
        ctrl.update(0.3);
        assert!(!ctrl.is_stunned());
        assert_eq!(ctrl.handle().resume_calls - resumes_before, 1);
        assert!(ctrl.is_moving());
    }

    #[test]
    fn dead_controller_ignores_everything() {
        let mut ctrl = controller(ElfColor::White);
        ctrl.kill();
        let stops = ctrl.handle().stop_calls;
        let resumes = ctrl.handle().resume_calls;

        ctrl.apply_stun();
        ctrl.update(5.0);
        ctrl.kill();

        assert!(ctrl.is_dead());
        assert_eq!(ctrl.handle().stop_calls, stops);
        assert_eq!(ctrl.handle().resume_calls, resumes);
    }

    #[test]
    fn negative_speed_rejected() {
        let mut profile = ElfProfile::for_color(ElfColor::Black);
        profile.speed = -1.0;
        let result = ElfController::new(
            Elf::new(profile),
            RecordingHandle::walkable(),
            &AgentConfig::default(),
            StdRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(AgentError::InvalidProfile { .. })));
    }

    #[test]
    fn nan_wander_interval_rejected() {
        let mut profile = ElfProfile::for_color(ElfColor::Black);
        profile.wander_interval = WanderInterval {
            min_secs: f32::NAN,
            max_secs: 1.0,
        };
        let result = ElfController::new(
            Elf::new(profile),
            RecordingHandle::walkable(),
            &AgentConfig::default(),
            StdRng::seed_from_u64(1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn teleport_moves_handle() {
        let mut ctrl = controller(ElfColor::Red);
        assert!(ctrl.teleport(Vec3::new(4.0, 0.0, -2.0)));
        assert!((ctrl.position().x - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn into_handle_stops_live_elf() {
        let ctrl = controller(ElfColor::Red);
        let handle = ctrl.into_handle();
        assert!(handle.stopped);
    }
}
