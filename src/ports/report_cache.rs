//! Report cache port - key/value storage for produced report data.
//!
//! Values are opaque strings (the caching producer stores JSON). Backends
//! own their own connection handling and synchronization.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Port for a string key/value cache with optional expiry.
#[async_trait]
pub trait ReportCache: Send + Sync {
    /// Returns the cached value, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value`, expiring after `ttl` when given.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// True if a live value exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
}

/// Errors from cache backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache value could not be encoded: {0}")]
    Serialization(String),
}
