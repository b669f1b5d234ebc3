//! Timeout decorator for report producers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::foundation::ReportKey;
use crate::domain::report::ReportRequest;
use crate::ports::{ProducerError, ReportData, ReportProducer};

/// Wraps a producer so each call fails with `ProducerError::Timeout` once
/// `timeout` elapses. The inner future is dropped on timeout.
#[derive(Clone)]
pub struct TimeoutReportProducer {
    inner: Arc<dyn ReportProducer>,
    timeout: Duration,
}

impl TimeoutReportProducer {
    pub fn new(inner: Arc<dyn ReportProducer>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ReportProducer for TimeoutReportProducer {
    async fn produce(
        &self,
        report_key: &ReportKey,
        request: &ReportRequest,
    ) -> Result<ReportData, ProducerError> {
        match tokio::time::timeout(self.timeout, self.inner.produce(report_key, request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    report_key = %report_key,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Report producer timed out"
                );
                Err(ProducerError::Timeout {
                    report_key: report_key.as_str().to_string(),
                    after: self.timeout,
                })
            }
        }
    }
}

impl std::fmt::Debug for TimeoutReportProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutReportProducer")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
