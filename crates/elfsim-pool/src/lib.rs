//! Capacity-bounded object pooling for the Exploding Elves simulation.
//!
//! Instances are recycled per archetype instead of being created and
//! destroyed. The pool enforces one global ceiling over everything it
//! owns, free or issued.
//!
//! # Modules
//!
//! - [`error`] -- Construction errors ([`PoolError`])
//! - [`expiry`] -- Lifetime countdown for timed despawns ([`ExpiryQueue`])
//! - [`pool`] -- The pool and its seams ([`ObjectPool`], [`Poolable`], [`Instantiator`])
//! - [`warmup`] -- Startup pre-creation ([`WarmupPlan`])

pub mod error;
pub mod expiry;
pub mod pool;
pub mod warmup;

pub use error::PoolError;
pub use expiry::ExpiryQueue;
pub use pool::{DEFAULT_POOL_CAPACITY, Despawned, Instantiator, ObjectPool, Poolable};
pub use warmup::{WarmupEntry, WarmupPlan, WarmupReport};
