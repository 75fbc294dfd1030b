//! Interval spawner.
//!
//! [`IntervalSpawner`] produces elves of one color on a configurable
//! cadence picked from a cyclic rate table. It never touches the pool
//! directly: every spawn becomes a [`SpawnOrder`] that the owner of the
//! pool drains and fulfils.

use elfsim_types::{ElfColor, SpawnerId, Vec3};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

/// Default spawn-rate table in seconds. `0` disables automatic spawning.
pub const DEFAULT_RATE_TABLE: [f32; 6] = [0.0, 3.0, 6.0, 12.0, 24.0, 48.0];

/// Default index into the rate table.
pub const DEFAULT_RATE_INDEX: usize = 3;

/// Default jitter radius around the spawner position.
pub const DEFAULT_SPAWN_RADIUS: f32 = 1.5;

/// Errors raised while building a spawner.
#[derive(Debug, thiserror::Error)]
pub enum SpawnerError {
    /// The rate table has no entries.
    #[error("spawn rate table must not be empty")]
    EmptyRateTable,

    /// A rate entry is negative or not finite.
    #[error("spawn rate {rate} at index {index} must be a non-negative number of seconds")]
    InvalidRate {
        /// Position of the bad entry.
        index: usize,
        /// The bad entry.
        rate: f32,
    },

    /// The starting index points past the table.
    #[error("rate index {index} out of range for table of length {len}")]
    RateIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Table length.
        len: usize,
    },

    /// The jitter radius is negative or not finite.
    #[error("spawn radius must be non-negative, got {radius}")]
    InvalidRadius {
        /// The bad radius.
        radius: f32,
    },
}

/// Why a spawn order was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnTrigger {
    /// The spawner's own timer fired, or it was just started.
    Scheduled,
    /// Someone asked for an elf through [`Spawner::spawn`](crate::Spawner::spawn).
    Requested,
}

/// Request to place one elf of `color` at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpawnOrder {
    /// Spawner that issued the order.
    pub spawner: SpawnerId,
    /// Color of the elf to place.
    pub color: ElfColor,
    /// Where to place it.
    pub position: Vec3,
    /// What produced the order.
    pub trigger: SpawnTrigger,
}

/// Spawner producing one color on a timer.
#[derive(Debug)]
pub struct IntervalSpawner {
    id: SpawnerId,
    color: ElfColor,
    center: Vec3,
    radius: f32,
    rate_table: Vec<f32>,
    rate_index: usize,
    timer: f32,
    running: bool,
    orders: Vec<SpawnOrder>,
    rng: StdRng,
}

impl IntervalSpawner {
    /// Build a stopped spawner.
    ///
    /// # Errors
    ///
    /// Returns a [`SpawnerError`] if the rate table is empty or holds a
    /// negative entry, if `rate_index` is out of range, or if `radius` is
    /// negative.
    pub fn new(
        color: ElfColor,
        center: Vec3,
        radius: f32,
        rate_table: Vec<f32>,
        rate_index: usize,
        rng: StdRng,
    ) -> Result<Self, SpawnerError> {
        validate_rate_table(&rate_table, rate_index)?;
        if !radius.is_finite() || radius < 0.0 {
            return Err(SpawnerError::InvalidRadius { radius });
        }

        let mut spawner = Self {
            id: SpawnerId::new(),
            color,
            center,
            radius,
            rate_table,
            rate_index,
            timer: 0.0,
            running: false,
            orders: Vec::new(),
            rng,
        };
        spawner.reset_timer();
        Ok(spawner)
    }

    /// Begin automatic spawning and produce one elf right away.
    pub fn start(&mut self) {
        self.running = true;
        self.reset_timer();
        self.enqueue(SpawnTrigger::Scheduled);
        info!(color = %self.color, rate = %self.rate_display(), "Spawner started");
    }

    /// Halt automatic spawning. Requested spawns still go through.
    pub fn stop(&mut self) {
        self.running = false;
        info!(color = %self.color, "Spawner stopped");
    }

    /// Step to the next rate in the table, wrapping around. Returns the
    /// new interval in seconds.
    pub fn cycle_rate(&mut self) -> f32 {
        let len = self.rate_table.len().max(1);
        self.rate_index = self.rate_index.saturating_add(1).checked_rem(len).unwrap_or(0);
        self.reset_timer();
        debug!(color = %self.color, rate = %self.rate_display(), "Spawn rate changed");
        self.interval()
    }

    /// Jump to a specific rate table index.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnerError::RateIndexOutOfRange`] if `index` is past the
    /// end of the table.
    pub fn set_rate_index(&mut self, index: usize) -> Result<(), SpawnerError> {
        if index >= self.rate_table.len() {
            return Err(SpawnerError::RateIndexOutOfRange {
                index,
                len: self.rate_table.len(),
            });
        }
        self.rate_index = index;
        self.reset_timer();
        Ok(())
    }

    /// Current interval in seconds; `0` means automatic spawning is off.
    pub fn interval(&self) -> f32 {
        self.rate_table.get(self.rate_index).copied().unwrap_or(0.0)
    }

    /// Current index into the rate table.
    pub const fn rate_index(&self) -> usize {
        self.rate_index
    }

    /// Human-readable rate: `"12s"`, or `"Disabled"` for a zero interval.
    pub fn rate_display(&self) -> String {
        let interval = self.interval();
        if interval > 0.0 {
            format!("{interval}s")
        } else {
            String::from("Disabled")
        }
    }

    /// Whether automatic spawning is on.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds until the next automatic spawn, `None` while stopped or
    /// disabled.
    pub fn time_to_next_spawn(&self) -> Option<f32> {
        (self.running && self.interval() > 0.0).then_some(self.timer.max(0.0))
    }

    /// Center of the spawn disc.
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Orders waiting to be drained.
    pub fn pending_orders(&self) -> usize {
        self.orders.len()
    }

    fn enqueue(&mut self, trigger: SpawnTrigger) {
        let position = self.jittered_position();
        self.orders.push(SpawnOrder {
            spawner: self.id,
            color: self.color,
            position,
            trigger,
        });
    }

    fn jittered_position(&mut self) -> Vec3 {
        if self.radius <= 0.0 {
            return self.center;
        }
        let angle = self.rng.random_range(0.0..core::f32::consts::TAU);
        let distance = self.radius * self.rng.random::<f32>().sqrt();
        self.center
            .offset_horizontal(distance * angle.cos(), distance * angle.sin())
    }

    fn reset_timer(&mut self) {
        let interval = self.interval();
        self.timer = if interval > 0.0 { interval } else { f32::MAX };
    }
}

impl crate::registry::Spawner for IntervalSpawner {
    fn id(&self) -> SpawnerId {
        self.id
    }

    fn color(&self) -> ElfColor {
        self.color
    }

    fn spawn(&mut self) -> bool {
        self.enqueue(SpawnTrigger::Requested);
        true
    }

    fn tick(&mut self, delta: f32) {
        if !self.running {
            return;
        }
        let interval = self.interval();
        if interval <= 0.0 {
            return;
        }
        self.timer -= delta.max(0.0);
        if self.timer <= 0.0 {
            self.enqueue(SpawnTrigger::Scheduled);
            // Overshoot carries into the next interval.
            self.timer += interval;
        }
    }

    fn take_orders(&mut self) -> Vec<SpawnOrder> {
        core::mem::take(&mut self.orders)
    }
}

fn validate_rate_table(rate_table: &[f32], rate_index: usize) -> Result<(), SpawnerError> {
    if rate_table.is_empty() {
        return Err(SpawnerError::EmptyRateTable);
    }
    if let Some((index, rate)) = rate_table
        .iter()
        .copied()
        .enumerate()
        .find(|(_, rate)| !rate.is_finite() || *rate < 0.0)
    {
        return Err(SpawnerError::InvalidRate { index, rate });
    }
    if rate_index >= rate_table.len() {
        return Err(SpawnerError::RateIndexOutOfRange {
            index: rate_index,
            len: rate_table.len(),
        });
    }
    Ok(())
}
