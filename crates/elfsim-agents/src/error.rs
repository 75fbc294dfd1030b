//! Error types for the elfsim-agents crate.
//!
//! Only construction can fail. Everything an elf does once it exists
//! (stun, kill, update, collision decisions) is infallible: operations on
//! a dead elf or a disabled movement handle are absorbed as no-ops.

use elfsim_types::ElfColor;

/// Errors that can occur while building an elf controller.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The elf profile contains a value the movement layer cannot use.
    #[error("invalid {color} elf profile: {reason}")]
    InvalidProfile {
        /// Color of the rejected profile.
        color: ElfColor,
        /// Description of the offending field.
        reason: String,
    },

    /// The agent configuration is unusable.
    #[error("invalid agent config: {reason}")]
    InvalidConfig {
        /// Description of the offending field.
        reason: String,
    },
}
