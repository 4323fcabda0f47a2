//! Provider health tracking
//!
//! Cooldown flags and success counters live in Redis so multiple gateway
//! restarts (and the observability stack) share one view. A provider with a
//! live `cooldown:<id>` key is excluded from routing until the key expires.

use crate::core::router::ids;
use crate::core::state::ProviderRegistry;
use crate::storage::RedisPool;
use tracing::warn;

/// Cooldown duration applied on quota exhaustion
pub const COOLDOWN_TTL_SECS: u64 = 60;

/// Per-provider cooldown flags and success counters over Redis
#[derive(Clone)]
pub struct HealthTracker {
    redis: RedisPool,
}

impl HealthTracker {
    pub fn new(redis: RedisPool) -> Self {
        Self { redis }
    }

    fn cooldown_key(id: &str) -> String {
        format!("cooldown:{}", id)
    }

    fn stats_key(id: &str) -> String {
        format!("stats:{}:requests", id)
    }

    /// Provider ids with no live cooldown, in registry order
    ///
    /// The local-GPU provider is removed when the GPU is not ready. Redis
    /// errors on the cooldown check count as "no cooldown" so an unreachable
    /// store never empties the candidate list.
    pub async fn sane_ids(&self, registry: &ProviderRegistry, gpu_ready: bool) -> Vec<String> {
        let mut sane = Vec::new();
        for id in registry.ids() {
            if !gpu_ready && id == ids::LOCAL_GPU {
                continue;
            }
            let cooling = self
                .redis
                .exists(&Self::cooldown_key(id))
                .await
                .unwrap_or_else(|e| {
                    warn!("Cooldown check failed for {}: {}", id, e);
                    false
                });
            if !cooling {
                sane.push(id.clone());
            }
        }
        sane
    }

    /// Put a provider on cooldown after quota exhaustion
    pub async fn mark_failure(&self, id: &str) {
        match self
            .redis
            .set_ex(&Self::cooldown_key(id), "BLOCKED", COOLDOWN_TTL_SECS)
            .await
        {
            Ok(()) => warn!("[COOLDOWN] {} blocked for {}s", id, COOLDOWN_TTL_SECS),
            Err(e) => warn!("Failed to set cooldown for {}: {}", id, e),
        }
    }

    /// Increment the provider's success counter
    pub async fn mark_success(&self, id: &str) {
        if let Err(e) = self.redis.incr(&Self::stats_key(id)).await {
            warn!("Failed to record success for {}: {}", id, e);
        }
    }
}

/// Whether an upstream error indicates quota exhaustion
///
/// Only these errors trigger a cooldown; transient failures must not evict a
/// provider.
pub fn is_quota_error(text: &str) -> bool {
    text.contains("429") || text.to_lowercase().contains("quota")
}
