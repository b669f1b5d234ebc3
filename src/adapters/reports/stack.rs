//! Producer decorator assembly from configuration.

use std::sync::Arc;

use tracing::info;

use super::{CachingReportProducer, TimeoutReportProducer};
use crate::config::ReportsConfig;
use crate::ports::{DistributedLock, ReportCache, ReportProducer};

/// Wraps `base` in the decorators `config` asks for.
///
/// The timeout always applies and sits closest to `base`. Caching sits
/// outside it, so cache hits are never subject to the timeout. Caching is
/// enabled only when `config.enable_cache` is set and a cache is supplied;
/// the lock is used only together with the cache.
pub fn producer_stack(
    base: Arc<dyn ReportProducer>,
    config: &ReportsConfig,
    cache: Option<Arc<dyn ReportCache>>,
    lock: Option<Arc<dyn DistributedLock>>,
) -> Arc<dyn ReportProducer> {
    let timed: Arc<dyn ReportProducer> =
        Arc::new(TimeoutReportProducer::new(base, config.producer_timeout()));

    match cache {
        Some(cache) if config.enable_cache => {
            let mut caching = CachingReportProducer::new(timed, cache).with_ttl(config.cache_ttl());
            if let Some(lock) = lock {
                caching = caching.with_lock(lock, config.lock_wait(), config.lock_lease());
            }
            info!(
                ttl_secs = config.cache_ttl_secs,
                "Report caching enabled"
            );
            Arc::new(caching)
        }
        _ => timed,
    }
}
