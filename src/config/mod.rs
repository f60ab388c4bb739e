//! Engine and pool configuration.
//!
//! [`EngineConfig`] carries the engine-wide knobs (ratio tolerance,
//! reservation lifetime, settler policy) and can be loaded from JSON;
//! [`PoolConfig`] describes one pool to create.

mod engine;
mod pool;

pub use engine::{EngineConfig, SettlerPolicy};
pub use pool::PoolConfig;
