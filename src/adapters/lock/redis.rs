//! Redis-backed distributed lock.
//!
//! Acquisition is `SET key token NX PX lease`, retried until the wait budget
//! runs out. Release deletes the key only if it still holds the caller's
//! token, so an expired holder cannot free someone else's lease.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use tracing::debug;

use super::{deadline_after, deadline_passed, RETRY_INTERVAL};
use crate::adapters::redis_connection::{self, px_millis};
use crate::config::RedisConfig;
use crate::ports::{DistributedLock, LockError, LockToken};

/// Default namespace for lock keys.
pub const DEFAULT_KEY_PREFIX: &str = "dashboard_exporter:lock:";

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Redis-backed DistributedLock.
#[derive(Clone)]
pub struct RedisDistributedLock {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisDistributedLock {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Connects using `config`, namespacing keys under
    /// `{config.key_prefix}lock:`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, LockError> {
        let conn = redis_connection::connect(config).await.map_err(unavailable)?;
        Ok(Self::new(conn).with_key_prefix(redis_connection::section_prefix(config, "lock")))
    }

    /// Override the key namespace.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn try_acquire(&self, key: &str, lease: Duration) -> Result<Option<LockToken>, LockError> {
        let mut conn = self.conn.clone();
        let token = LockToken::generate();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(token.as_str())
            .arg("NX")
            .arg("PX")
            .arg(px_millis(lease))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(reply.map(|_| token))
    }
}

fn unavailable(e: redis::RedisError) -> LockError {
    LockError::Unavailable(e.to_string())
}

#[async_trait]
impl DistributedLock for RedisDistributedLock {
    async fn acquire(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> Result<Option<LockToken>, LockError> {
        let redis_key = self.namespaced(key);
        let deadline = deadline_after(wait);
        loop {
            if let Some(token) = self.try_acquire(&redis_key, lease).await? {
                return Ok(Some(token));
            }
            if deadline_passed(deadline) {
                debug!(lock_key = %redis_key, "Lock still held after wait; giving up");
                return Ok(None);
            }
            tokio::time::sleep(RETRY_INTERVAL).await;
        }
    }

    async fn release(&self, key: &str, token: &LockToken) -> Result<bool, LockError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = Script::new(RELEASE_SCRIPT)
            .key(self.namespaced(key))
            .arg(token.as_str())
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(deleted == 1)
    }

    async fn is_locked(&self, key: &str) -> Result<bool, LockError> {
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(self.namespaced(key))
            .await
            .map_err(unavailable)
    }
}

impl std::fmt::Debug for RedisDistributedLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisDistributedLock")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}
