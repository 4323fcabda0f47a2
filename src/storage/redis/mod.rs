//! Redis storage implementation
//!
//! ## Module Structure
//!
//! - `pool` - Connection handling and no-op mode
//! - `ops` - Key-value operations used by the gateway (get, setex, exists,
//!   incr, ttl)

mod ops;
mod pool;

pub use pool::{RedisConnection, RedisPool};
