//! Configuration loading and typed config structures for the simulation.
//!
//! The canonical configuration lives in `elfsim-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader, and [`SimulationConfig::validate`] for the checks
//! serde cannot express.

use std::collections::BTreeSet;
use std::path::Path;

use elfsim_agents::AgentConfig;
use elfsim_pool::{DEFAULT_POOL_CAPACITY, WarmupPlan};
use elfsim_types::{ElfColor, Vec3};
use serde::Deserialize;

use crate::cooldown::DEFAULT_COOLDOWN_SECS;
use crate::spawner::{DEFAULT_RATE_INDEX, DEFAULT_RATE_TABLE, DEFAULT_SPAWN_RADIUS};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `elfsim-config.yaml`. Every section and field
/// is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World geometry and timing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Bonus spawn throttling.
    #[serde(default)]
    pub collision: CollisionConfig,

    /// Object pool sizing.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Spawners and their rate table.
    #[serde(default)]
    pub spawning: SpawningConfig,

    /// Elf wander tunables.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Run boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty or negative rate
    /// table, an out-of-range rate index, a zero pool capacity, duplicate
    /// spawner colors, a non-positive tick delta, or bad agent tunables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid { reason });

        if !self.world.delta_secs.is_finite() || self.world.delta_secs <= 0.0 {
            return invalid(format!(
                "world.delta_secs must be positive, got {}",
                self.world.delta_secs
            ));
        }
        if !self.world.half_extent.is_finite() || self.world.half_extent <= 0.0 {
            return invalid(format!(
                "world.half_extent must be positive, got {}",
                self.world.half_extent
            ));
        }
        if self.pool.capacity == 0 {
            return invalid(String::from("pool.capacity must be at least 1"));
        }

        let table = &self.spawning.rate_table;
        if table.is_empty() {
            return invalid(String::from("spawning.rate_table must not be empty"));
        }
        if let Some(rate) = table.iter().find(|r| !r.is_finite() || **r < 0.0) {
            return invalid(format!("spawning.rate_table entry {rate} must be non-negative"));
        }

        let mut seen = BTreeSet::new();
        for spawner in &self.spawning.spawners {
            if !seen.insert(spawner.color) {
                return invalid(format!("duplicate spawner for color {}", spawner.color));
            }
            if spawner.rate_index >= table.len() {
                return invalid(format!(
                    "spawner {} rate_index {} out of range for table of length {}",
                    spawner.color,
                    spawner.rate_index,
                    table.len()
                ));
            }
        }

        self.agents
            .validate()
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })
    }
}

/// World geometry and timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks (0 = run as fast as possible).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Simulated seconds per tick.
    #[serde(default = "default_delta_secs")]
    pub delta_secs: f32,

    /// The world is the square `[-half_extent, half_extent]` on x and z.
    #[serde(default = "default_half_extent")]
    pub half_extent: f32,

    /// Two elves closer than this are in contact.
    #[serde(default = "default_contact_radius")]
    pub contact_radius: f32,

    /// Seconds after spawning during which an elf ignores contacts.
    #[serde(default = "default_collision_grace_secs")]
    pub collision_grace_secs: f32,

    /// Seconds a dead elf stays in the world before returning to the pool.
    #[serde(default = "default_death_despawn_secs")]
    pub death_despawn_secs: f32,

    /// Seconds an effect instance lives before returning to the pool.
    #[serde(default = "default_effect_lifetime_secs")]
    pub effect_lifetime_secs: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            delta_secs: default_delta_secs(),
            half_extent: default_half_extent(),
            contact_radius: default_contact_radius(),
            collision_grace_secs: default_collision_grace_secs(),
            death_despawn_secs: default_death_despawn_secs(),
            effect_lifetime_secs: default_effect_lifetime_secs(),
        }
    }
}

/// Bonus spawn throttling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollisionConfig {
    /// Global cooldown between bonus spawns (negative is treated as 0).
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

/// Object pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolConfig {
    /// Global ceiling over all pooled instances, free or issued.
    #[serde(default = "default_pool_capacity")]
    pub capacity: usize,

    /// Instances created ahead of time at startup.
    #[serde(default)]
    pub warmup: WarmupPlan,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: default_pool_capacity(),
            warmup: WarmupPlan::default(),
        }
    }
}

/// Spawners and their shared rate table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawningConfig {
    /// Selectable spawn intervals in seconds; 0 disables automatic spawns.
    #[serde(default = "default_rate_table")]
    pub rate_table: Vec<f32>,

    /// One entry per spawner. At most one spawner per color.
    #[serde(default = "default_spawners")]
    pub spawners: Vec<SpawnerConfig>,
}

impl Default for SpawningConfig {
    fn default() -> Self {
        Self {
            rate_table: default_rate_table(),
            spawners: default_spawners(),
        }
    }
}

/// One color's spawner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawnerConfig {
    /// Color produced.
    pub color: ElfColor,

    /// Center of the spawn disc.
    #[serde(default)]
    pub position: Vec3,

    /// Radius of the spawn disc.
    #[serde(default = "default_spawn_radius")]
    pub radius: f32,

    /// Starting index into the rate table.
    #[serde(default = "default_rate_index")]
    pub rate_index: usize,

    /// Start spawning as soon as the simulation starts.
    #[serde(default = "default_true")]
    pub autostart: bool,
}

impl SpawnerConfig {
    /// Spawner for `color` at `position` with default settings.
    pub const fn new(color: ElfColor, position: Vec3) -> Self {
        Self {
            color,
            position,
            radius: DEFAULT_SPAWN_RADIUS,
            rate_index: DEFAULT_RATE_INDEX,
            autostart: true,
        }
    }
}

/// Run boundaries. A value of 0 means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            max_real_time_seconds: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    20
}

const fn default_delta_secs() -> f32 {
    0.02
}

const fn default_half_extent() -> f32 {
    25.0
}

const fn default_contact_radius() -> f32 {
    1.0
}

const fn default_collision_grace_secs() -> f32 {
    3.0
}

const fn default_death_despawn_secs() -> f32 {
    6.0
}

const fn default_effect_lifetime_secs() -> f32 {
    2.0
}

const fn default_cooldown_secs() -> f32 {
    DEFAULT_COOLDOWN_SECS
}

const fn default_pool_capacity() -> usize {
    DEFAULT_POOL_CAPACITY
}

fn default_rate_table() -> Vec<f32> {
    DEFAULT_RATE_TABLE.to_vec()
}

const fn default_rate_index() -> usize {
    DEFAULT_RATE_INDEX
}

const fn default_spawn_radius() -> f32 {
    DEFAULT_SPAWN_RADIUS
}

fn default_spawners() -> Vec<SpawnerConfig> {
    vec![
        SpawnerConfig::new(ElfColor::Black, Vec3::new(-10.0, 0.0, -10.0)),
        SpawnerConfig::new(ElfColor::Red, Vec3::new(10.0, 0.0, -10.0)),
        SpawnerConfig::new(ElfColor::White, Vec3::new(-10.0, 0.0, 10.0)),
        SpawnerConfig::new(ElfColor::Blue, Vec3::new(10.0, 0.0, 10.0)),
    ]
}

const fn default_max_ticks() -> u64 {
    3000
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_true() -> bool {
    true
}
