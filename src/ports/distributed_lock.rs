//! Distributed lock port - mutual exclusion across service instances.
//!
//! Locks are leased: every acquisition carries an expiry so a crashed holder
//! cannot block others forever. Acquisition returns an owner token, and only
//! the matching token can release the lock.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Port for acquiring and releasing named locks.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Tries to acquire `key` for `lease`, retrying for up to `wait`.
    ///
    /// Returns `None` if the lock is still held by someone else after `wait`.
    async fn acquire(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> Result<Option<LockToken>, LockError>;

    /// Releases `key` if it is still held under `token`.
    ///
    /// Returns `false` when the lock had expired or belongs to another owner.
    async fn release(&self, key: &str, token: &LockToken) -> Result<bool, LockError>;

    /// True if `key` is currently held by anyone.
    async fn is_locked(&self, key: &str) -> Result<bool, LockError>;
}

/// Proof of lock ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockToken(String);

impl LockToken {
    /// Creates a new random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from lock backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("Lock service unavailable: {0}")]
    Unavailable(String),
}
