//! Storage backends
//!
//! The gateway keeps all cross-process state (cooldowns, counters, rate-limit
//! buckets, GPU status) in Redis; this module provides the connection layer.

pub mod redis;

pub use redis::RedisPool;
