//! Global spawn cooldown gate.
//!
//! One gate throttles every bonus spawn granted by same-color collisions.
//! The gate keeps its own timeline: it only learns about time through
//! [`SpawnCooldownGate::advance`], called once per tick with the tick
//! delta. Before the first registered spawn the gate is open.

/// Default cooldown between bonus spawns, in seconds.
pub const DEFAULT_COOLDOWN_SECS: f32 = 3.0;

/// Timestamps this close to the deadline count as having reached it.
///
/// Frame deltas are `f32` values such as `0.02` that are not exact in
/// binary, so a sum of N deltas can land a few ulps short of `N * delta`.
const DEADLINE_TOLERANCE_SECS: f64 = 1e-6;

/// Throttle allowing at most one bonus spawn per cooldown window.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnCooldownGate {
    /// Fixed cooldown length, never negative.
    duration: f32,

    /// Gate time in seconds, the sum of every delta seen so far.
    now: f64,

    /// Gate time of the last registered spawn, `None` before the first.
    last_spawn: Option<f64>,
}

impl Default for SpawnCooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_SECS)
    }
}

impl SpawnCooldownGate {
    /// Create an open gate. Negative or non-finite durations are treated
    /// as zero, which keeps the gate permanently open.
    pub fn new(duration_secs: f32) -> Self {
        let duration = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        Self {
            duration,
            now: 0.0,
            last_spawn: None,
        }
    }

    /// Move the gate's clock forward by `delta` seconds.
    ///
    /// Accumulates in `f64` exactly like [`SimClock`](crate::SimClock), so
    /// gate time and clock time agree tick for tick.
    pub fn advance(&mut self, delta: f32) {
        if delta.is_finite() && delta > 0.0 {
            self.now += f64::from(delta);
        }
    }

    /// Whether a bonus spawn may be granted now: `now >= last + duration`.
    pub fn can_spawn(&self) -> bool {
        self.last_spawn
            .is_none_or(|last| self.now + DEADLINE_TOLERANCE_SECS >= self.deadline(last))
    }

    /// Record a granted spawn at the current time. Always restarts the
    /// window, whether or not the previous one had elapsed.
    pub const fn register_spawn(&mut self) {
        self.last_spawn = Some(self.now);
    }

    /// Seconds until the gate opens again, never negative.
    pub fn remaining_cooldown(&self) -> f64 {
        if self.can_spawn() {
            return 0.0;
        }
        self.last_spawn
            .map_or(0.0, |last| (self.deadline(last) - self.now).max(0.0))
    }

    /// The fixed cooldown length.
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    /// Gate time in seconds.
    pub const fn now(&self) -> f64 {
        self.now
    }

    fn deadline(&self, last: f64) -> f64 {
        last + f64::from(self.duration)
    }
}
