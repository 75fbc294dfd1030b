//! Simulation clock.
//!
//! The clock counts ticks and accumulates simulated time. Each tick
//! advances by a fixed delta supplied at construction; nothing in the
//! simulation reads wall-clock time.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid clock configuration (e.g. non-positive delta).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Tick counter plus elapsed simulated seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    /// Ticks completed so far.
    tick: u64,

    /// Simulated seconds per tick.
    delta_secs: f32,

    /// Simulated seconds since tick 0.
    elapsed_secs: f64,
}

impl SimClock {
    /// Create a clock at tick 0 advancing `delta_secs` per tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `delta_secs` is not a
    /// positive finite number.
    pub fn new(delta_secs: f32) -> Result<Self, ClockError> {
        if !delta_secs.is_finite() || delta_secs <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("delta_secs must be positive, got {delta_secs}"),
            });
        }
        Ok(Self {
            tick: 0,
            delta_secs,
            elapsed_secs: 0.0,
        })
    }

    /// Advance one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        self.elapsed_secs += f64::from(self.delta_secs);
        Ok(self.tick)
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds per tick.
    pub const fn delta_secs(&self) -> f32 {
        self.delta_secs
    }

    /// Simulated seconds since tick 0.
    pub const fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }
}
