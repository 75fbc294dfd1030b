//! Spawn throttling, spawner dispatch, and collision resolution for the
//! Exploding Elves simulation.
//!
//! This crate owns the shared services a collision touches and the
//! configuration that builds them. Per-elf logic lives in `elfsim-agents`;
//! instance recycling lives in `elfsim-pool`.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and simulated time ([`SimClock`]).
//! - [`config`] -- Configuration loading from `elfsim-config.yaml` into
//!   strongly-typed structs.
//! - [`contact`] -- Pair normalisation and overlap-entry filtering.
//! - [`cooldown`] -- Global bonus-spawn throttle ([`SpawnCooldownGate`]).
//! - [`registry`] -- [`Spawner`] trait and color-keyed [`SpawnerRegistry`].
//! - [`resolver`] -- [`CollisionResolver`], the collision orchestrator.
//! - [`spawner`] -- Timer-driven [`IntervalSpawner`] and [`SpawnOrder`].

pub mod clock;
pub mod config;
pub mod contact;
pub mod cooldown;
pub mod registry;
pub mod resolver;
pub mod spawner;

pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, SimulationConfig};
pub use contact::{ContactPair, OverlapTracker, should_resolve};
pub use cooldown::SpawnCooldownGate;
pub use registry::{Spawner, SpawnerRegistry};
pub use resolver::{Collidable, CollisionResolver, CollisionResult, ResolverStats};
pub use spawner::{IntervalSpawner, SpawnOrder, SpawnTrigger, SpawnerError};
