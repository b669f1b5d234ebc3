//! Read-through caching decorator for report producers.
//!
//! Successful producer results (rows, empty, unknown) are stored as JSON.
//! Producer errors are never cached. When a lock is configured, a cache miss
//! takes a short lease before recomputing so concurrent instances asking for
//! the same report do not all hit the backend.
//!
//! Cache and lock are best-effort: any failure there degrades to a direct
//! producer call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::foundation::ReportKey;
use crate::domain::report::ReportRequest;
use crate::ports::{DistributedLock, ProducerError, ReportCache, ReportData, ReportProducer};

/// Cache key for one producer call:
/// `report:{key}:{period}:{start}:{end}:{workplaces}`.
///
/// Each workplace id is written as `{byte length}:{id}` so ids containing
/// the separator cannot collide with a different filter.
pub fn cache_key(report_key: &ReportKey, request: &ReportRequest) -> String {
    let workplaces = request
        .workplace_filter()
        .iter()
        .map(|id| format!("{}:{}", id.as_str().len(), id.as_str()))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "report:{}:{}:{}:{}:{}",
        report_key,
        request.period(),
        request.start().format("%Y-%m-%d"),
        request.end().format("%Y-%m-%d"),
        workplaces
    )
}

struct LockSettings {
    lock: Arc<dyn DistributedLock>,
    wait: Duration,
    lease: Duration,
}

/// ReportProducer decorator that caches results through a [`ReportCache`].
pub struct CachingReportProducer {
    inner: Arc<dyn ReportProducer>,
    cache: Arc<dyn ReportCache>,
    ttl: Option<Duration>,
    lock: Option<LockSettings>,
}

impl CachingReportProducer {
    pub fn new(inner: Arc<dyn ReportProducer>, cache: Arc<dyn ReportCache>) -> Self {
        Self {
            inner,
            cache,
            ttl: None,
            lock: None,
        }
    }

    /// Expire cached results after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Guard recomputation with `lock`, waiting up to `wait` for a holder
    /// and taking a lease of `lease`.
    pub fn with_lock(mut self, lock: Arc<dyn DistributedLock>, wait: Duration, lease: Duration) -> Self {
        self.lock = Some(LockSettings { lock, wait, lease });
        self
    }

    async fn cached(&self, key: &str) -> Option<ReportData> {
        match self.cache.get(key).await {
            Ok(Some(json)) => match serde_json::from_str::<ReportData>(&json) {
                Ok(data) => {
                    debug!(cache_key = key, "Report cache hit");
                    Some(data)
                }
                Err(e) => {
                    warn!(cache_key = key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                debug!(cache_key = key, "Report cache miss");
                None
            }
            Err(e) => {
                warn!(cache_key = key, error = %e, "Report cache read failed; bypassing cache");
                None
            }
        }
    }

    async fn store(&self, key: &str, data: &ReportData) {
        let json = match serde_json::to_string(data) {
            Ok(json) => json,
            Err(e) => {
                warn!(cache_key = key, error = %e, "Failed to encode report for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, json, self.ttl).await {
            warn!(cache_key = key, error = %e, "Report cache write failed");
        }
    }

    async fn compute_and_store(
        &self,
        key: &str,
        report_key: &ReportKey,
        request: &ReportRequest,
    ) -> Result<ReportData, ProducerError> {
        let data = self.inner.produce(report_key, request).await?;
        self.store(key, &data).await;
        Ok(data)
    }

    async fn compute_under_lock(
        &self,
        settings: &LockSettings,
        key: &str,
        report_key: &ReportKey,
        request: &ReportRequest,
    ) -> Result<ReportData, ProducerError> {
        let lock_key = format!("lock:{}", key);
        match settings.lock.acquire(&lock_key, settings.wait, settings.lease).await {
            Ok(Some(token)) => {
                // Another holder may have filled the cache while we waited.
                let result = match self.cached(key).await {
                    Some(data) => Ok(data),
                    None => self.compute_and_store(key, report_key, request).await,
                };
                match settings.lock.release(&lock_key, &token).await {
                    Ok(true) => {}
                    Ok(false) => debug!(lock_key = %lock_key, "Lock lease expired before release"),
                    Err(e) => warn!(lock_key = %lock_key, error = %e, "Failed to release report lock"),
                }
                result
            }
            Ok(None) => {
                debug!(lock_key = %lock_key, "Report lock contended; computing without it");
                match self.cached(key).await {
                    Some(data) => Ok(data),
                    None => self.compute_and_store(key, report_key, request).await,
                }
            }
            Err(e) => {
                warn!(lock_key = %lock_key, error = %e, "Report lock unavailable; computing without it");
                self.compute_and_store(key, report_key, request).await
            }
        }
    }
}

#[async_trait]
impl ReportProducer for CachingReportProducer {
    async fn produce(
        &self,
        report_key: &ReportKey,
        request: &ReportRequest,
    ) -> Result<ReportData, ProducerError> {
        let key = cache_key(report_key, request);

        if let Some(data) = self.cached(&key).await {
            return Ok(data);
        }

        match &self.lock {
            Some(settings) => {
                self.compute_under_lock(settings, &key, report_key, request)
                    .await
            }
            None => self.compute_and_store(&key, report_key, request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryReportCache;
    use crate::adapters::lock::InMemoryDistributedLock;
    use crate::domain::foundation::WorkplaceId;
    use crate::domain::report::{Period, ReportRow};
    use crate::ports::{CacheError, LockError, LockToken};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ─────────────────────────────────────────────────────────────────────
    // Mock Implementations
    // ─────────────────────────────────────────────────────────────────────

    struct CountingProducer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProducer {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), fail: true }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReportProducer for CountingProducer {
        async fn produce(
            &self,
            report_key: &ReportKey,
            _request: &ReportRequest,
        ) -> Result<ReportData, ProducerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProducerError::Unavailable("backend down".to_string()));
            }
            Ok(ReportData::Rows(vec![ReportRow::new()
                .with("report", report_key.as_str())
                .with("visits", 110_i64)]))
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl ReportCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    struct BrokenLock;

    #[async_trait]
    impl DistributedLock for BrokenLock {
        async fn acquire(&self, _key: &str, _wait: Duration, _lease: Duration) -> Result<Option<LockToken>, LockError> {
            Err(LockError::Unavailable("connection refused".to_string()))
        }

        async fn release(&self, _key: &str, _token: &LockToken) -> Result<bool, LockError> {
            Err(LockError::Unavailable("connection refused".to_string()))
        }

        async fn is_locked(&self, _key: &str) -> Result<bool, LockError> {
            Err(LockError::Unavailable("connection refused".to_string()))
        }
    }

    fn key(k: &str) -> ReportKey {
        ReportKey::new(k).unwrap()
    }

    fn request(wps: &[&str]) -> ReportRequest {
        ReportRequest::new(
            vec![key("activity_summary")],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
        .with_period(Period::Week)
        .with_workplace_filter(wps.iter().map(|w| WorkplaceId::new(*w).unwrap()).collect())
    }

    #[test]
    fn cache_key_covers_every_request_dimension() {
        let cache_key = cache_key(&key("activity_summary"), &request(&["wp1", "wp2"]));
        assert_eq!(cache_key, "report:activity_summary:week:2024-01-01:2024-01-31:3:wp1,3:wp2");
    }

    #[test]
    fn workplace_ids_containing_separator_get_distinct_keys() {
        let split = cache_key(&key("activity_summary"), &request(&["wp1", "wp4"]));
        let joined = cache_key(&key("activity_summary"), &request(&["wp1,wp4"]));
        assert_ne!(split, joined);
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let inner = Arc::new(CountingProducer::new());
        let cache = Arc::new(InMemoryReportCache::new());
        let producer = CachingReportProducer::new(inner.clone(), cache.clone());

        let first = producer.produce(&key("activity_summary"), &request(&["wp1"])).await.unwrap();
        let second = producer.produce(&key("activity_summary"), &request(&["wp1"])).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn different_workplaces_are_cached_separately() {
        let inner = Arc::new(CountingProducer::new());
        let producer = CachingReportProducer::new(inner.clone(), Arc::new(InMemoryReportCache::new()));

        producer.produce(&key("activity_summary"), &request(&["wp1"])).await.unwrap();
        producer.produce(&key("activity_summary"), &request(&["wp2"])).await.unwrap();

        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn joined_workplace_id_is_not_served_rows_of_separate_ids() {
        let inner = Arc::new(CountingProducer::new());
        let producer = CachingReportProducer::new(inner.clone(), Arc::new(InMemoryReportCache::new()));

        producer.produce(&key("activity_summary"), &request(&["wp1", "wp4"])).await.unwrap();
        producer.produce(&key("activity_summary"), &request(&["wp1,wp4"])).await.unwrap();

        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn producer_errors_are_not_cached() {
        let inner = Arc::new(CountingProducer::failing());
        let cache = Arc::new(InMemoryReportCache::new());
        let producer = CachingReportProducer::new(inner.clone(), cache.clone());

        assert!(producer.produce(&key("k"), &request(&["wp1"])).await.is_err());
        assert!(producer.produce(&key("k"), &request(&["wp1"])).await.is_err());

        assert_eq!(inner.calls(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn expired_entries_are_recomputed() {
        let inner = Arc::new(CountingProducer::new());
        let producer = CachingReportProducer::new(inner.clone(), Arc::new(InMemoryReportCache::new()))
            .with_ttl(Duration::from_millis(20));

        producer.produce(&key("k"), &request(&["wp1"])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        producer.produce(&key("k"), &request(&["wp1"])).await.unwrap();

        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn undecodable_entry_is_treated_as_miss() {
        let inner = Arc::new(CountingProducer::new());
        let cache = Arc::new(InMemoryReportCache::new());
        let req = request(&["wp1"]);
        cache
            .set(&cache_key(&key("k"), &req), "not json".to_string(), None)
            .await
            .unwrap();
        let producer = CachingReportProducer::new(inner.clone(), cache);

        let data = producer.produce(&key("k"), &req).await.unwrap();

        assert!(data.has_rows());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn broken_cache_degrades_to_direct_call() {
        let inner = Arc::new(CountingProducer::new());
        let producer = CachingReportProducer::new(inner.clone(), Arc::new(BrokenCache));

        let data = producer.produce(&key("k"), &request(&["wp1"])).await.unwrap();

        assert!(data.has_rows());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn lock_is_released_after_compute() {
        let inner = Arc::new(CountingProducer::new());
        let lock = Arc::new(InMemoryDistributedLock::new());
        let req = request(&["wp1"]);
        let producer = CachingReportProducer::new(inner.clone(), Arc::new(InMemoryReportCache::new()))
            .with_lock(lock.clone(), Duration::from_millis(100), Duration::from_secs(5));

        producer.produce(&key("k"), &req).await.unwrap();

        let lock_key = format!("lock:{}", cache_key(&key("k"), &req));
        assert!(!lock.is_locked(&lock_key).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_misses_compute_once_under_lock() {
        let inner = Arc::new(CountingProducer::new());
        let producer = Arc::new(
            CachingReportProducer::new(inner.clone(), Arc::new(InMemoryReportCache::new()))
                .with_lock(
                    Arc::new(InMemoryDistributedLock::new()),
                    Duration::from_secs(2),
                    Duration::from_secs(5),
                ),
        );
        let req = request(&["wp1"]);
        let (k1, k2) = (key("k"), key("k"));

        let (a, b) = tokio::join!(
            producer.produce(&k1, &req),
            producer.produce(&k2, &req)
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn broken_lock_degrades_to_direct_call() {
        let inner = Arc::new(CountingProducer::new());
        let producer = CachingReportProducer::new(inner.clone(), Arc::new(InMemoryReportCache::new()))
            .with_lock(Arc::new(BrokenLock), Duration::from_millis(10), Duration::from_secs(1));

        let data = producer.produce(&key("k"), &request(&["wp1"])).await.unwrap();

        assert!(data.has_rows());
        assert_eq!(inner.calls(), 1);
    }
}
