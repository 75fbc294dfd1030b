//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: elfsim_core::ConfigError,
    },

    /// Simulation clock failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: elfsim_core::ClockError,
    },

    /// Object pool construction failed.
    #[error("pool error: {source}")]
    Pool {
        /// The underlying pool error.
        #[from]
        source: elfsim_pool::PoolError,
    },

    /// A configured spawner could not be built.
    #[error("spawner error: {source}")]
    Spawner {
        /// The underlying spawner error.
        #[from]
        source: elfsim_core::SpawnerError,
    },

    /// Agent tunables were rejected.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: elfsim_agents::AgentError,
    },
}
