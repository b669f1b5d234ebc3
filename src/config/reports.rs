//! Report generation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound for `max_concurrent_reports`.
pub const MAX_CONCURRENT_REPORTS_LIMIT: usize = 64;

/// Report generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    /// Days before today used as the start date when a request omits one
    #[serde(default = "default_lookback_days")]
    pub default_lookback_days: u64,

    /// Report keys produced concurrently per request (1 = sequential)
    #[serde(default = "default_max_concurrent_reports")]
    pub max_concurrent_reports: usize,

    /// Per-report producer timeout in seconds
    #[serde(default = "default_producer_timeout")]
    pub producer_timeout_secs: u64,

    /// Cache producer results
    #[serde(default)]
    pub enable_cache: bool,

    /// Cached result lifetime in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// How long a cache miss waits for another instance's recompute lock
    #[serde(default = "default_lock_wait")]
    pub lock_wait_millis: u64,

    /// Recompute lock lease in seconds
    #[serde(default = "default_lock_lease")]
    pub lock_lease_secs: u64,
}

impl ReportsConfig {
    pub fn producer_timeout(&self) -> Duration {
        Duration::from_secs(self.producer_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_millis)
    }

    pub fn lock_lease(&self) -> Duration {
        Duration::from_secs(self.lock_lease_secs)
    }

    /// Validate report configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrent_reports == 0 || self.max_concurrent_reports > MAX_CONCURRENT_REPORTS_LIMIT {
            return Err(ValidationError::InvalidConcurrency {
                max: MAX_CONCURRENT_REPORTS_LIMIT,
            });
        }
        if self.producer_timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("producer_timeout_secs"));
        }
        if self.enable_cache {
            if self.cache_ttl_secs == 0 {
                return Err(ValidationError::MustBePositive("cache_ttl_secs"));
            }
            if self.lock_lease_secs == 0 {
                return Err(ValidationError::MustBePositive("lock_lease_secs"));
            }
        }
        Ok(())
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            default_lookback_days: default_lookback_days(),
            max_concurrent_reports: default_max_concurrent_reports(),
            producer_timeout_secs: default_producer_timeout(),
            enable_cache: false,
            cache_ttl_secs: default_cache_ttl(),
            lock_wait_millis: default_lock_wait(),
            lock_lease_secs: default_lock_lease(),
        }
    }
}

fn default_lookback_days() -> u64 {
    365
}

fn default_max_concurrent_reports() -> usize {
    4
}

fn default_producer_timeout() -> u64 {
    30
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_lock_wait() -> u64 {
    500
}

fn default_lock_lease() -> u64 {
    30
}
