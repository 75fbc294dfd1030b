//! Shared type definitions for the Exploding Elves simulation.
//!
//! This crate is the single source of truth for the value types used across
//! the workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the visual layer that renders the simulation.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and the pool [`Archetype`] key
//! - [`enums`] -- Elf colors and lifecycle phases
//! - [`structs`] -- Geometry and the static [`ElfProfile`]

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ElfColor, LifecyclePhase};
pub use ids::{Archetype, ElfId, InstanceId, SpawnerId};
pub use structs::{ElfProfile, Rotation, Vec3, WanderInterval};
