//! Elf lifecycle, movement, and collision policy for the Exploding Elves
//! simulation.
//!
//! This crate contains the per-elf logic layer: everything that operates on
//! a single elf (or a pair, for collision decisions) without owning any
//! shared service. It sits between `elfsim-types` (value types) and
//! `elfsim-core` (cooldown, registry, collision orchestration).
//!
//! # Modules
//!
//! - [`config`] -- Wander tunables ([`AgentConfig`])
//! - [`controller`] -- Per-elf controller ([`ElfController`])
//! - [`error`] -- Construction errors ([`AgentError`])
//! - [`lifecycle`] -- Normal / Stunned / Dead state machine ([`Lifecycle`])
//! - [`movement`] -- Movement handle seam and wandering ([`WanderBehavior`])
//! - [`policy`] -- Collision rule ([`CollisionPolicy`], [`ColorMatchPolicy`])

pub mod config;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod movement;
pub mod policy;

// Re-export primary types at crate root for convenience.
pub use config::AgentConfig;
pub use controller::{Elf, ElfController};
pub use error::AgentError;
pub use lifecycle::{
    Lifecycle, LifecycleEvent, LifecycleState, MotionControl, MotionEffect, STUN_DURATION_SECS,
};
pub use movement::{MovementHandle, WanderBehavior};
pub use policy::{CollisionDecision, CollisionPolicy, ColorMatchPolicy};
