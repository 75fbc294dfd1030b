//! Tunables for elf movement.
//!
//! [`AgentConfig`] bundles the wander parameters so callers (engine,
//! tests) can override defaults. It deserializes from the `agents` key of
//! `elfsim-config.yaml`; every field is optional.

use serde::Deserialize;

use crate::error::AgentError;

/// Configuration for elf wandering, applied to every controller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentConfig {
    /// Radius of the disc a new wander target is drawn from (default: 20).
    #[serde(default = "default_wander_radius")]
    pub wander_radius: f32,

    /// Number of candidate points tried before giving up on a new wander
    /// target (default: 10).
    #[serde(default = "default_wander_attempts")]
    pub wander_attempts: u32,

    /// Speed above which an elf counts as moving (default: 0.1).
    #[serde(default = "default_moving_speed_threshold")]
    pub moving_speed_threshold: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            wander_radius: default_wander_radius(),
            wander_attempts: default_wander_attempts(),
            moving_speed_threshold: default_moving_speed_threshold(),
        }
    }
}

const fn default_wander_radius() -> f32 {
    20.0
}

const fn default_wander_attempts() -> u32 {
    10
}

const fn default_moving_speed_threshold() -> f32 {
    0.1
}

impl AgentConfig {
    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), AgentError> {
        if !self.wander_radius.is_finite() || self.wander_radius <= 0.0 {
            return Err(AgentError::InvalidConfig {
                reason: format!("wander_radius must be positive, got {}", self.wander_radius),
            });
        }
        if self.wander_attempts == 0 {
            return Err(AgentError::InvalidConfig {
                reason: String::from("wander_attempts must be at least 1"),
            });
        }
        if !self.moving_speed_threshold.is_finite() || self.moving_speed_threshold < 0.0 {
            return Err(AgentError::InvalidConfig {
                reason: format!(
                    "moving_speed_threshold must be non-negative, got {}",
                    self.moving_speed_threshold
                ),
            });
        }
        Ok(())
    }
}
