//! Redis-backed report cache for multi-instance deployments.
//!
//! Values are stored as plain strings under `{prefix}{key}`; TTLs use
//! millisecond precision (`SET ... PX`).

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::adapters::redis_connection::{self, px_millis};
use crate::config::RedisConfig;
use crate::ports::{CacheError, ReportCache};

/// Default namespace for cache keys.
pub const DEFAULT_KEY_PREFIX: &str = "dashboard_exporter:cache:";

/// Redis-backed ReportCache.
#[derive(Clone)]
pub struct RedisReportCache {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisReportCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Connects using `config`, namespacing keys under
    /// `{config.key_prefix}cache:`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let conn = redis_connection::connect(config).await.map_err(unavailable)?;
        Ok(Self::new(conn).with_key_prefix(redis_connection::section_prefix(config, "cache")))
    }

    /// Override the key namespace.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

fn unavailable(e: redis::RedisError) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

#[async_trait]
impl ReportCache for RedisReportCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(self.namespaced(key))
            .await
            .map_err(unavailable)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.namespaced(key)).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(px_millis(ttl));
        }
        cmd.query_async::<_, ()>(&mut conn).await.map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.namespaced(key))
            .await
            .map_err(unavailable)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(self.namespaced(key))
            .await
            .map_err(unavailable)
    }
}

impl std::fmt::Debug for RedisReportCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisReportCache")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_to_unreachable_server_is_unavailable() {
        let config = RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };

        let result = RedisReportCache::connect(&config).await;

        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    // Note: Redis integration tests require a running Redis instance
    // and are typically run separately from unit tests.
    //
    // #[tokio::test]
    // #[ignore] // Run with: cargo test -- --ignored
    // async fn test_redis_report_cache() {
    //     let config = RedisConfig { url: "redis://127.0.0.1/".to_string(), ..Default::default() };
    //     let cache = RedisReportCache::connect(&config).await.unwrap();
    //     cache.set("k", "v".to_string(), None).await.unwrap();
    //     assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    // }
}
