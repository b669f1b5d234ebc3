//! In-memory distributed lock.
//!
//! Leases expire on their own, so a crashed holder never blocks others past
//! its lease.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{deadline_after, deadline_passed, RETRY_INTERVAL};
use crate::ports::{DistributedLock, LockError, LockToken};

#[derive(Debug, Clone)]
struct Lease {
    token: LockToken,
    /// `None` for a lease too long to represent; it never expires.
    expires_at: Option<Instant>,
}

impl Lease {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory DistributedLock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDistributedLock {
    leases: Arc<Mutex<HashMap<String, Lease>>>,
}

impl InMemoryDistributedLock {
    pub fn new() -> Self {
        Self::default()
    }

    async fn try_acquire(&self, key: &str, lease: Duration) -> Option<LockToken> {
        let now = Instant::now();
        let mut leases = self.leases.lock().await;
        if leases.get(key).is_some_and(|held| held.is_live(now)) {
            return None;
        }
        let token = LockToken::generate();
        leases.insert(
            key.to_string(),
            Lease {
                token: token.clone(),
                expires_at: now.checked_add(lease),
            },
        );
        Some(token)
    }
}

#[async_trait]
impl DistributedLock for InMemoryDistributedLock {
    async fn acquire(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> Result<Option<LockToken>, LockError> {
        let deadline = deadline_after(wait);
        loop {
            if let Some(token) = self.try_acquire(key, lease).await {
                return Ok(Some(token));
            }
            if deadline_passed(deadline) {
                debug!(lock_key = key, "Lock still held after wait; giving up");
                return Ok(None);
            }
            tokio::time::sleep(RETRY_INTERVAL).await;
        }
    }

    async fn release(&self, key: &str, token: &LockToken) -> Result<bool, LockError> {
        let mut leases = self.leases.lock().await;
        match leases.get(key) {
            Some(held) if &held.token == token => {
                leases.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn is_locked(&self, key: &str) -> Result<bool, LockError> {
        let now = Instant::now();
        Ok(self
            .leases
            .lock()
            .await
            .get(key)
            .is_some_and(|held| held.is_live(now)))
    }
}
