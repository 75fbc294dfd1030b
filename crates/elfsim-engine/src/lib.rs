//! Headless engine for the Exploding Elves simulation.
//!
//! Wires the collision services from `elfsim-core`, the per-elf
//! controllers from `elfsim-agents`, and the shared pool from
//! `elfsim-pool` into a fixed-step world.
//!
//! # Modules
//!
//! - [`body`] -- Straight-line movement confined to a square world.
//! - [`error`] -- [`EngineError`], the top-level error type.
//! - [`objects`] -- Pooled elf bodies and effects.
//! - [`runner`] -- The bounded async tick loop.
//! - [`world`] -- [`World`] and the per-tick cycle.

pub mod body;
pub mod error;
pub mod objects;
pub mod runner;
pub mod world;

pub use error::EngineError;
pub use runner::{EndReason, SimulationResult, log_simulation_end, run_simulation};
pub use world::{TickSummary, World, WorldTotals};
