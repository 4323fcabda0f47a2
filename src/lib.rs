//! # Neural Home Gateway
//!
//! Unified chat-completions gateway for a small private AI infrastructure.
//! Exposes a single OpenAI-compatible endpoint and, for every request,
//! chooses among heterogeneous upstream providers: a local GPU-backed
//! inference server plus cloud APIs with different free tiers and wire
//! dialects.
//!
//! ## How a request flows
//!
//! 1. The distributed token-bucket limiter admits or rejects the request.
//! 2. A lightweight judge model classifies intent and language.
//! 3. The router picks the preferred provider from the classification, the
//!    GPU readiness flag and the cooldown state.
//! 4. The waterfall executor tries providers in ranked order, streaming or
//!    buffered, putting quota-exhausted upstreams on cooldown.
//!
//! Shared state (cooldowns, counters, buckets, GPU status) lives in Redis;
//! the provider inventory comes from a checksum-validated state document
//! written by an external scan tool.

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod monitoring;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

pub use crate::core::judge::{Category, Classification, JudgeClient, clean_query};
pub use crate::core::limiter::{BucketClass, RateLimiter};
pub use crate::core::providers::{GoogleClient, ProviderReply};
pub use crate::core::router::{RoutingMode, decide};
pub use crate::core::state::{ProviderRegistry, StateLoader};
pub use crate::core::types::{ChatCompletionRequest, ChatMessage, MessageRole};
pub use crate::core::waterfall::WaterfallExecutor;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(NAME, "neural-home-gateway");
    }
}
