//! Distributed token-bucket rate limiter
//!
//! Buckets live in Redis keyed by `(subject, class)`; the read-modify-write
//! is a single server-side Lua script, so concurrent gateways (or workers)
//! get serialized decisions. When Redis is unreachable the limiter fails
//! open: availability over enforcement.

use crate::storage::RedisPool;
use crate::utils::error::Result;
use redis::Script;
use std::sync::Arc;
use tracing::warn;

/// The only rate-limit subject in the current single-tenant deployment
pub const GLOBAL_SUBJECT: &str = "global_user";

/// Bucket TTL, refreshed on every use
const BUCKET_TTL_SECS: u64 = 3600;

/// Atomic bucket update
///
/// KEYS[1] = token level, KEYS[2] = last-refill timestamp (seconds).
/// ARGV = burst, refill per second, cost, now, ttl. Returns 1 when the cost
/// was consumed, 0 when the request must be rejected.
const TOKEN_BUCKET_SCRIPT: &str = r#"
local level = tonumber(redis.call('GET', KEYS[1]) or ARGV[1])
local last = tonumber(redis.call('GET', KEYS[2]) or ARGV[4])
local elapsed = tonumber(ARGV[4]) - last
if elapsed < 0 then elapsed = 0 end
level = math.min(tonumber(ARGV[1]), level + elapsed * tonumber(ARGV[2]))
local allowed = 0
if level >= tonumber(ARGV[3]) then
  level = level - tonumber(ARGV[3])
  allowed = 1
end
redis.call('SET', KEYS[1], level, 'EX', ARGV[5])
redis.call('SET', KEYS[2], ARGV[4], 'EX', ARGV[5])
return allowed
"#;

/// Rate-limit class of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketClass {
    Global,
    Expensive,
    Cheap,
}

impl BucketClass {
    pub const ALL: [BucketClass; 3] = [
        BucketClass::Global,
        BucketClass::Expensive,
        BucketClass::Cheap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketClass::Global => "global",
            BucketClass::Expensive => "expensive",
            BucketClass::Cheap => "cheap",
        }
    }

    /// Maximum tokens the bucket can hold
    pub fn burst(&self) -> f64 {
        match self {
            BucketClass::Global => 1000.0,
            BucketClass::Expensive => 50.0,
            BucketClass::Cheap => 2000.0,
        }
    }

    /// Refill rate in tokens per minute
    pub fn refill_per_minute(&self) -> f64 {
        match self {
            BucketClass::Global => 60.0,
            BucketClass::Expensive => 5.0,
            BucketClass::Cheap => 120.0,
        }
    }

    fn refill_per_second(&self) -> f64 {
        self.refill_per_minute() / 60.0
    }

    /// Classify a request by its requested model string
    pub fn for_model(model: &str) -> Self {
        let model = model.to_lowercase();
        if model.contains("gpt-4") || model.contains("claude") {
            BucketClass::Expensive
        } else {
            BucketClass::Cheap
        }
    }
}

/// Token-bucket limiter over Redis
#[derive(Clone)]
pub struct RateLimiter {
    redis: RedisPool,
    script: Arc<Script>,
}

impl RateLimiter {
    pub fn new(redis: RedisPool) -> Self {
        Self {
            redis,
            script: Arc::new(Script::new(TOKEN_BUCKET_SCRIPT)),
        }
    }

    fn keys(subject: &str, class: BucketClass) -> (String, String) {
        let bucket = format!("limiter:{}:{}", subject, class.as_str());
        let ts = format!("{}:ts", bucket);
        (bucket, ts)
    }

    /// Consume `cost` tokens if they fit; fails open on any Redis error
    pub async fn allow(&self, subject: &str, class: BucketClass, cost: f64) -> bool {
        match self.try_allow(subject, class, cost).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!("Rate limiter unavailable, failing open: {}", e);
                true
            }
        }
    }

    async fn try_allow(&self, subject: &str, class: BucketClass, cost: f64) -> Result<bool> {
        let mut conn = self.redis.get_connection().await?;
        let Some(ref mut c) = conn.conn else {
            // No-op pool: Redis was unavailable at startup
            return Ok(true);
        };

        let (bucket_key, ts_key) = Self::keys(subject, class);
        let now = chrono::Utc::now().timestamp();
        let allowed: i64 = self
            .script
            .key(&bucket_key)
            .key(&ts_key)
            .arg(class.burst())
            .arg(class.refill_per_second())
            .arg(cost)
            .arg(now)
            .arg(BUCKET_TTL_SECS)
            .invoke_async(c)
            .await?;
        Ok(allowed == 1)
    }

    /// Read-only estimate of the current token level
    ///
    /// Used by the metrics scrape; never mutates the bucket. `None` when
    /// Redis is unavailable.
    pub async fn remaining(&self, subject: &str, class: BucketClass) -> Option<f64> {
        if self.redis.is_noop() {
            return None;
        }

        let (bucket_key, ts_key) = Self::keys(subject, class);
        let stored = self.redis.get(&bucket_key).await.ok()?;
        let Some(stored) = stored else {
            // Bucket not yet created: full burst available
            return Some(class.burst());
        };
        let level: f64 = stored.parse().ok()?;

        let now = chrono::Utc::now().timestamp();
        let last = self
            .redis
            .get(&ts_key)
            .await
            .ok()?
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(now);
        let elapsed = (now - last).max(0) as f64;

        Some((level + elapsed * class.refill_per_second()).min(class.burst()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_string_selects_bucket_class() {
        assert_eq!(BucketClass::for_model("gpt-4"), BucketClass::Expensive);
        assert_eq!(BucketClass::for_model("GPT-4o-mini"), BucketClass::Expensive);
        assert_eq!(
            BucketClass::for_model("claude-3-sonnet"),
            BucketClass::Expensive
        );
        assert_eq!(BucketClass::for_model("qwen-max"), BucketClass::Cheap);
        assert_eq!(BucketClass::for_model("llama-3.3-70b"), BucketClass::Cheap);
    }

    #[test]
    fn bucket_parameters() {
        assert_eq!(BucketClass::Global.burst(), 1000.0);
        assert_eq!(BucketClass::Global.refill_per_minute(), 60.0);
        assert_eq!(BucketClass::Expensive.burst(), 50.0);
        assert_eq!(BucketClass::Expensive.refill_per_minute(), 5.0);
        assert_eq!(BucketClass::Cheap.burst(), 2000.0);
        assert_eq!(BucketClass::Cheap.refill_per_minute(), 120.0);
    }

    #[test]
    fn key_layout() {
        let (bucket, ts) = RateLimiter::keys(GLOBAL_SUBJECT, BucketClass::Expensive);
        assert_eq!(bucket, "limiter:global_user:expensive");
        assert_eq!(ts, "limiter:global_user:expensive:ts");
    }

    #[test]
    fn script_is_a_single_atomic_round_trip() {
        // The whole read-modify-write must live in the script: no level
        // arithmetic may leak to the Rust side.
        assert!(TOKEN_BUCKET_SCRIPT.contains("math.min"));
        assert!(TOKEN_BUCKET_SCRIPT.contains("GET"));
        assert!(TOKEN_BUCKET_SCRIPT.contains("SET"));
        assert!(TOKEN_BUCKET_SCRIPT.contains("elapsed"));
    }

    #[tokio::test]
    async fn fails_open_without_redis() {
        let limiter = RateLimiter::new(RedisPool::create_noop());
        for _ in 0..100 {
            assert!(
                limiter
                    .allow(GLOBAL_SUBJECT, BucketClass::Expensive, 1.0)
                    .await
            );
        }
    }

    #[tokio::test]
    async fn remaining_unknown_without_redis() {
        let limiter = RateLimiter::new(RedisPool::create_noop());
        assert_eq!(
            limiter.remaining(GLOBAL_SUBJECT, BucketClass::Cheap).await,
            None
        );
    }
}
