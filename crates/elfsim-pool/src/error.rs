//! Pool errors.

/// Errors raised while building a pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// A pool must be able to hold at least one instance.
    #[error("pool capacity must be at least 1")]
    ZeroCapacity,
}
