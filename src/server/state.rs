//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::health::HealthTracker;
use crate::core::judge::JudgeClient;
use crate::core::limiter::RateLimiter;
use crate::core::providers::GoogleClient;
use crate::core::router::{RoutingState, SharedRoutingState};
use crate::core::state::StateLoader;
use crate::monitoring::Metrics;
use crate::storage::RedisPool;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// HTTP server state shared across handlers
///
/// Everything heavy is behind an `Arc`; handlers clone freely.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Shared Redis pool
    pub redis: RedisPool,
    /// State loader holding the provider registry
    pub state: Arc<StateLoader>,
    /// Cooldown and success tracking
    pub health: HealthTracker,
    /// Distributed token-bucket limiter
    pub limiter: RateLimiter,
    /// Judge client for request classification
    pub judge: JudgeClient,
    /// Google-native dialect client
    pub google: Arc<GoogleClient>,
    /// Shared HTTP client for openai-compatible upstreams
    pub http: reqwest::Client,
    /// Prometheus metrics registry
    pub metrics: Arc<Metrics>,
    /// Process-wide routing mode
    pub routing: SharedRoutingState,
}

impl AppState {
    /// Create a new AppState wiring the shared resources together
    pub fn new(
        config: Config,
        redis: RedisPool,
        state: Arc<StateLoader>,
        google: Arc<GoogleClient>,
        judge: JudgeClient,
        metrics: Arc<Metrics>,
    ) -> Self {
        let health = HealthTracker::new(redis.clone());
        let limiter = RateLimiter::new(redis.clone());
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            config: Arc::new(config),
            redis,
            state,
            health,
            limiter,
            judge,
            google,
            http,
            metrics,
            routing: Arc::new(RwLock::new(RoutingState::default())),
        }
    }
}
