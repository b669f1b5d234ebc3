//! Shared Redis connection setup for the cache and lock adapters.

use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::{ErrorKind, RedisError};
use tracing::info;

use crate::config::RedisConfig;

/// Opens a multiplexed connection to `config.url`, giving up after
/// `config.timeout()`.
pub async fn connect(config: &RedisConfig) -> Result<MultiplexedConnection, RedisError> {
    let client = redis::Client::open(config.url.as_str())?;
    let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| RedisError::from((ErrorKind::IoError, "Redis connection timed out")))??;
    info!(timeout_secs = config.timeout_secs, "Connected to Redis");
    Ok(conn)
}

/// `{config.key_prefix}{section}`, e.g. `dashboard_exporter:cache:`.
pub fn section_prefix(config: &RedisConfig, section: &str) -> String {
    format!("{}{}:", config.key_prefix, section)
}

/// `PX` argument for `duration`: at least 1 (Redis rejects `PX 0`) and
/// clamped to the signed 64-bit range Redis accepts.
pub fn px_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX).max(1)
}
