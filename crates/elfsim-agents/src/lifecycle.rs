//! Elf lifecycle state machine.
//!
//! Every elf is in exactly one of three states:
//!
//! - `Normal` (initial): wandering; each tick advances the wander cadence.
//! - `Stunned`: frozen for [`STUN_DURATION_SECS`] after a collision. A
//!   second stun resets the countdown to the full duration; it never
//!   compounds.
//! - `Dead` (terminal): movement stopped permanently. Every further event
//!   is absorbed.
//!
//! The transition table lives in [`step`], a pure function from
//! `(state, event)` to `(state, effect)`. [`Lifecycle`] applies the
//! resulting [`MotionEffect`] to a [`MotionControl`] implementation, which
//! keeps the table testable without any movement layer at all.

use elfsim_types::LifecyclePhase;
use tracing::trace;

/// How long a collision freezes an elf, in seconds.
pub const STUN_DURATION_SECS: f32 = 0.5;

/// Movement side of the lifecycle: what a state transition asks the
/// movement layer to do.
pub trait MotionControl {
    /// Halt immediately and forget any pending destination.
    fn stop(&mut self);

    /// Un-halt and immediately pick a new wander target.
    fn resume(&mut self);

    /// Advance free movement by `delta` seconds (wander cadence).
    fn advance(&mut self, delta: f32);
}

/// Full lifecycle state, including the stun countdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleState {
    /// Wandering freely.
    Normal,
    /// Frozen until `remaining` seconds have elapsed.
    Stunned {
        /// Seconds left before returning to `Normal`. Never increases
        /// except when a new stun resets it to the full duration.
        remaining: f32,
    },
    /// Destroyed.
    Dead,
}

impl LifecycleState {
    /// The data-free phase of this state.
    pub const fn phase(self) -> LifecyclePhase {
        match self {
            Self::Normal => LifecyclePhase::Normal,
            Self::Stunned { .. } => LifecyclePhase::Stunned,
            Self::Dead => LifecyclePhase::Dead,
        }
    }
}

/// Something that happens to an elf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleEvent {
    /// A collision stunned the elf.
    Stun,
    /// The elf was destroyed.
    Kill,
    /// One simulation tick of `delta` seconds elapsed.
    Tick(f32),
}

/// Side effect a transition requests from the movement layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEffect {
    /// Halt and clear the destination.
    Stop,
    /// Un-halt and pick a new wander target.
    Resume,
    /// Continue wandering for `delta` seconds.
    Advance(f32),
}

/// Compute the next state and the movement side effect for an event.
///
/// Negative or NaN tick deltas are treated as zero so a stun countdown
/// can only shrink.
pub fn step(state: LifecycleState, event: LifecycleEvent) -> (LifecycleState, Option<MotionEffect>) {
    match (state, event) {
        (LifecycleState::Dead, _) => (LifecycleState::Dead, None),
        (_, LifecycleEvent::Kill) => (LifecycleState::Dead, Some(MotionEffect::Stop)),
        (LifecycleState::Normal, LifecycleEvent::Stun) => (
            LifecycleState::Stunned {
                remaining: STUN_DURATION_SECS,
            },
            Some(MotionEffect::Stop),
        ),
        (LifecycleState::Stunned { .. }, LifecycleEvent::Stun) => (
            LifecycleState::Stunned {
                remaining: STUN_DURATION_SECS,
            },
            None,
        ),
        (LifecycleState::Normal, LifecycleEvent::Tick(delta)) => (
            LifecycleState::Normal,
            Some(MotionEffect::Advance(delta.max(0.0))),
        ),
        (LifecycleState::Stunned { remaining }, LifecycleEvent::Tick(delta)) => {
            let remaining = remaining - delta.max(0.0);
            if remaining <= 0.0 {
                (LifecycleState::Normal, Some(MotionEffect::Resume))
            } else {
                (LifecycleState::Stunned { remaining }, None)
            }
        }
    }
}

/// Owner of one elf's lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Create a lifecycle in the `Normal` state.
    ///
    /// The caller is responsible for starting movement; the controller
    /// does this when the elf enters the world.
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Normal,
        }
    }

    /// Current state, including the stun countdown.
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Current phase.
    pub const fn phase(&self) -> LifecyclePhase {
        self.state.phase()
    }

    /// Whether the elf is dead.
    pub const fn is_dead(&self) -> bool {
        matches!(self.state, LifecycleState::Dead)
    }

    /// Whether the elf is stunned.
    pub const fn is_stunned(&self) -> bool {
        matches!(self.state, LifecycleState::Stunned { .. })
    }

    /// Seconds left in the current stun, if stunned.
    pub const fn stun_remaining(&self) -> Option<f32> {
        match self.state {
            LifecycleState::Stunned { remaining } => Some(remaining),
            LifecycleState::Normal | LifecycleState::Dead => None,
        }
    }

    /// Stun the elf. No-op when dead; resets the countdown when already
    /// stunned.
    pub fn apply_stun<M: MotionControl + ?Sized>(&mut self, motion: &mut M) -> LifecyclePhase {
        self.handle(LifecycleEvent::Stun, motion)
    }

    /// Kill the elf. Idempotent.
    pub fn kill<M: MotionControl + ?Sized>(&mut self, motion: &mut M) -> LifecyclePhase {
        self.handle(LifecycleEvent::Kill, motion)
    }

    /// Advance one tick of `delta` seconds.
    pub fn update<M: MotionControl + ?Sized>(&mut self, delta: f32, motion: &mut M) -> LifecyclePhase {
        self.handle(LifecycleEvent::Tick(delta), motion)
    }

    /// Apply an event, run its movement side effect, and return the
    /// resulting phase.
    pub fn handle<M: MotionControl + ?Sized>(
        &mut self,
        event: LifecycleEvent,
        motion: &mut M,
    ) -> LifecyclePhase {
        let before = self.state.phase();
        let (next, effect) = step(self.state, event);
        self.state = next;

        match effect {
            Some(MotionEffect::Stop) => motion.stop(),
            Some(MotionEffect::Resume) => motion.resume(),
            Some(MotionEffect::Advance(delta)) => motion.advance(delta),
            None => {}
        }

        let after = next.phase();
        if before != after {
            trace!(from = %before, to = %after, ?event, "Lifecycle transition");
        }
        after
    }
}
