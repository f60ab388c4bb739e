//! Pool records and the store that owns them.

mod pool;
mod pool_store;

pub use pool::{Pool, PoolUpdate};
pub(crate) use pool_store::PoolGuard;
pub use pool_store::PoolStore;
