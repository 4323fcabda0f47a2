//! Core routing engine
//!
//! - `types` - wire shapes and provider descriptors
//! - `state` - checksum-validated state loading and the provider registry
//! - `health` - cooldown flags and success counters over Redis
//! - `limiter` - distributed token-bucket rate limiter
//! - `judge` - request classification via lightweight models
//! - `router` - pure routing decision and process-wide routing mode
//! - `providers` - the two upstream wire-dialect adapters
//! - `waterfall` - ranked fallback execution

pub mod health;
pub mod judge;
pub mod limiter;
pub mod providers;
pub mod router;
pub mod state;
pub mod types;
pub mod waterfall;
