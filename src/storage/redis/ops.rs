//! Key-value operations used by the gateway
//!
//! Only the primitives the router actually needs: plain GET, SETEX, EXISTS,
//! INCR and TTL. Scripted bucket updates are issued by the rate limiter
//! through a connection obtained from the pool.

use super::pool::RedisPool;
use crate::utils::error::{GatewayError, Result};
use redis::{AsyncCommands, RedisResult};

impl RedisPool {
    /// Get a string value
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.noop_mode {
            return Ok(None);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let result: RedisResult<Option<String>> = c.get(key).await;
            match result {
                Ok(value) => Ok(value),
                Err(e) if e.kind() == redis::ErrorKind::TypeError => Ok(None),
                Err(e) => Err(GatewayError::Redis(e)),
            }
        } else {
            Ok(None)
        }
    }

    /// Set a key with a TTL in seconds (SETEX)
    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c
                .set_ex(key, value, ttl_seconds)
                .await
                .map_err(GatewayError::Redis)?;
        }
        Ok(())
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        if self.noop_mode {
            return Ok(false);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let exists: bool = c.exists(key).await.map_err(GatewayError::Redis)?;
            Ok(exists)
        } else {
            Ok(false)
        }
    }

    /// Increment key value by one
    pub async fn incr(&self, key: &str) -> Result<i64> {
        if self.noop_mode {
            return Ok(1);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let new_value: i64 = c.incr(key, 1).await.map_err(GatewayError::Redis)?;
            Ok(new_value)
        } else {
            Ok(1)
        }
    }

    /// Get time to live for a key
    pub async fn ttl(&self, key: &str) -> Result<i64> {
        if self.noop_mode {
            return Ok(-2); // Key does not exist
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let ttl: i64 = c.ttl(key).await.map_err(GatewayError::Redis)?;
            Ok(ttl)
        } else {
            Ok(-2)
        }
    }
}
