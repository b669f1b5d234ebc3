//! GenerateDashboardReportHandler - access-filtered report aggregation.
//!
//! Resolves the caller's accessible workplaces, reconciles them with the
//! requested filter, then fans out to the report producer once per requested
//! report key. Each key yields exactly one output file:
//!
//! - rows: `{key}_{period}_{start}_to_{end}.csv` (tabular)
//! - no rows / unknown key: `{key}_no_data.txt` (text)
//! - producer failure: `{key}_error.txt` (text)
//!
//! Only a workplace resolver failure fails the whole request. Producer
//! failures (including panics) are contained to their own key.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use super::reconcile::reconcile_workplaces;
use crate::domain::foundation::{CallerId, ReportKey, WorkplaceId};
use crate::domain::report::{AggregatedReport, ReportOutputFile, ReportRequest};
use crate::ports::{AccessResolutionError, ReportData, ReportProducer, WorkplaceResolver};

/// Default number of report keys produced concurrently.
pub const DEFAULT_MAX_CONCURRENT_REPORTS: usize = 4;

/// Handler for generating an aggregated dashboard report.
///
/// Holds only its two port references; concurrent invocations share no
/// mutable state.
pub struct GenerateDashboardReportHandler {
    resolver: Arc<dyn WorkplaceResolver>,
    producer: Arc<dyn ReportProducer>,
    max_concurrent_reports: usize,
}

impl GenerateDashboardReportHandler {
    pub fn new(resolver: Arc<dyn WorkplaceResolver>, producer: Arc<dyn ReportProducer>) -> Self {
        Self {
            resolver,
            producer,
            max_concurrent_reports: DEFAULT_MAX_CONCURRENT_REPORTS,
        }
    }

    /// Sets how many report keys may be in flight at once. `1` processes keys
    /// sequentially. Output order never depends on this value.
    pub fn with_max_concurrent_reports(mut self, limit: usize) -> Self {
        self.max_concurrent_reports = limit.max(1);
        self
    }

    /// Generates one output file per report key of `request`, in request order.
    ///
    /// Returns an empty report when the caller has no accessible workplaces,
    /// or when none of the specifically requested workplaces are accessible.
    /// Dropping the returned future cancels every in-flight producer call;
    /// no partial report is ever returned.
    ///
    /// # Errors
    ///
    /// Returns `AccessResolutionError` if the workplace resolver fails.
    pub async fn execute(
        &self,
        request: &ReportRequest,
        caller: Option<&CallerId>,
    ) -> Result<AggregatedReport, AccessResolutionError> {
        let caller_label = caller.map(CallerId::as_str).unwrap_or("<anonymous>");
        info!(
            caller = caller_label,
            reports = request.report_keys().len(),
            period = %request.period(),
            start = %request.start(),
            end = %request.end(),
            "Generating dashboard report"
        );

        let accessible: Vec<WorkplaceId> = self
            .resolver
            .resolve_accessible(caller)
            .await?
            .iter()
            .map(|workplace| workplace.id().clone())
            .collect();

        let reconciliation = reconcile_workplaces(request.workplace_filter(), &accessible);

        for denied in &reconciliation.denied {
            warn!(
                caller = caller_label,
                workplace_id = %denied,
                "Requested workplace is not accessible; skipping"
            );
        }

        if reconciliation.is_empty() {
            if request.is_unfiltered() {
                warn!(caller = caller_label, "Caller has no accessible workplaces; returning empty report");
            } else {
                warn!(
                    caller = caller_label,
                    "None of the requested workplaces are accessible; returning empty report"
                );
            }
            return Ok(AggregatedReport::empty());
        }

        let resolved = request.restricted_to(reconciliation.granted);

        let pending: Vec<_> = request
            .report_keys()
            .iter()
            .map(|report_key| self.generate_file(report_key, &resolved))
            .collect();
        let files: Vec<ReportOutputFile> = stream::iter(pending)
            .buffered(self.max_concurrent_reports)
            .collect()
            .await;

        info!(
            caller = caller_label,
            files = files.len(),
            "Dashboard report generation complete"
        );
        Ok(AggregatedReport::new(files))
    }

    async fn generate_file(&self, report_key: &ReportKey, request: &ReportRequest) -> ReportOutputFile {
        debug!(
            report_key = %report_key,
            workplaces = request.workplace_filter().len(),
            "Producing report data"
        );

        let outcome = AssertUnwindSafe(self.producer.produce(report_key, request))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(ReportData::Rows(rows))) if !rows.is_empty() => {
                debug!(report_key = %report_key, rows = rows.len(), "Report data produced");
                ReportOutputFile::tabular(
                    report_key,
                    request.period(),
                    request.start(),
                    request.end(),
                    rows,
                )
            }
            Ok(Ok(ReportData::Rows(_))) | Ok(Ok(ReportData::Empty)) => {
                warn!(report_key = %report_key, "No data returned for report");
                ReportOutputFile::no_data(
                    report_key,
                    format!(
                        "No data found for report '{}' with the given parameters.",
                        report_key
                    ),
                )
            }
            Ok(Ok(ReportData::UnknownReport)) => {
                warn!(report_key = %report_key, "Report key is not recognized");
                ReportOutputFile::no_data(
                    report_key,
                    format!(
                        "Report '{}' is not recognized; no data was generated.",
                        report_key
                    ),
                )
            }
            Ok(Err(e)) => {
                error!(report_key = %report_key, error = %e, "Report generation failed");
                ReportOutputFile::error(
                    report_key,
                    format!(
                        "An error occurred while generating report '{}': {}",
                        report_key, e
                    ),
                )
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(report_key = %report_key, reason = %reason, "Report producer panicked");
                ReportOutputFile::error(
                    report_key,
                    format!(
                        "An error occurred while generating report '{}': producer panicked: {}",
                        report_key, reason
                    ),
                )
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{ContentKind, Period, ReportRow};
    use crate::domain::workplace::Workplace;
    use crate::ports::ProducerError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // ─────────────────────────────────────────────────────────────────────
    // Mock Implementations
    // ─────────────────────────────────────────────────────────────────────

    struct MockResolver {
        workplaces: Vec<Workplace>,
        should_fail: bool,
        seen_callers: Mutex<Vec<Option<String>>>,
    }

    impl MockResolver {
        fn with_workplaces(ids: &[&str]) -> Self {
            Self {
                workplaces: ids
                    .iter()
                    .map(|id| Workplace::new(WorkplaceId::new(*id).unwrap(), id.to_uppercase()))
                    .collect(),
                should_fail: false,
                seen_callers: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                workplaces: vec![],
                should_fail: true,
                seen_callers: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WorkplaceResolver for MockResolver {
        async fn resolve_accessible(
            &self,
            caller: Option<&CallerId>,
        ) -> Result<Vec<Workplace>, AccessResolutionError> {
            self.seen_callers
                .lock()
                .unwrap()
                .push(caller.map(|c| c.as_str().to_string()));
            if self.should_fail {
                return Err(AccessResolutionError::Unavailable("Simulated failure".to_string()));
            }
            Ok(self.workplaces.clone())
        }

        async fn find_by_id(
            &self,
            workplace_id: &WorkplaceId,
        ) -> Result<Option<Workplace>, AccessResolutionError> {
            Ok(self.workplaces.iter().find(|w| w.id() == workplace_id).cloned())
        }
    }

    #[derive(Clone)]
    enum Scripted {
        Rows(usize),
        Empty,
        Unknown,
        Fail,
        Panic,
        Delay(Duration),
        Hang,
    }

    struct MockProducer {
        script: HashMap<String, Scripted>,
        calls: Mutex<Vec<(String, Vec<WorkplaceId>)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockProducer {
        fn new(script: &[(&str, Scripted)]) -> Self {
            Self {
                script: script
                    .iter()
                    .map(|(k, s)| (k.to_string(), s.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> Vec<(String, Vec<WorkplaceId>)> {
            self.calls.lock().unwrap().clone()
        }

        fn rows(report_key: &ReportKey, count: usize) -> Vec<ReportRow> {
            (0..count)
                .map(|i| {
                    ReportRow::new()
                        .with("report", report_key.as_str())
                        .with("index", i as i64)
                })
                .collect()
        }
    }

    #[async_trait]
    impl ReportProducer for MockProducer {
        async fn produce(
            &self,
            report_key: &ReportKey,
            request: &ReportRequest,
        ) -> Result<ReportData, ProducerError> {
            self.calls.lock().unwrap().push((
                report_key.as_str().to_string(),
                request.workplace_filter().to_vec(),
            ));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let script = self
                .script
                .get(report_key.as_str())
                .cloned()
                .unwrap_or(Scripted::Unknown);
            let result = match script {
                Scripted::Rows(n) => Ok(ReportData::Rows(Self::rows(report_key, n))),
                Scripted::Empty => Ok(ReportData::Empty),
                Scripted::Unknown => Ok(ReportData::UnknownReport),
                Scripted::Fail => Err(ProducerError::QueryFailed("malformed query".to_string())),
                Scripted::Panic => panic!("producer exploded"),
                Scripted::Delay(d) => {
                    tokio::time::sleep(d).await;
                    Ok(ReportData::Rows(Self::rows(report_key, 1)))
                }
                Scripted::Hang => std::future::pending().await,
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(names: &[&str]) -> Vec<WorkplaceId> {
        names.iter().map(|n| WorkplaceId::new(*n).unwrap()).collect()
    }

    fn request(keys: &[&str]) -> ReportRequest {
        ReportRequest::new(
            keys.iter().map(|k| ReportKey::new(*k).unwrap()).collect(),
            date(2024, 1, 1),
            date(2024, 1, 10),
        )
        .unwrap()
        .with_period(Period::Day)
    }

    fn handler(resolver: MockResolver, producer: Arc<MockProducer>) -> GenerateDashboardReportHandler {
        GenerateDashboardReportHandler::new(Arc::new(resolver), producer)
    }

    fn caller(id: &str) -> CallerId {
        CallerId::new(id).unwrap()
    }

    fn filenames(report: &AggregatedReport) -> Vec<&str> {
        report.files().iter().map(|f| f.filename()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Ordering
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn produces_one_file_per_key_in_request_order_including_duplicates() {
        let producer = Arc::new(MockProducer::new(&[
            ("k1", Scripted::Rows(2)),
            ("k2", Scripted::Empty),
            ("k3", Scripted::Rows(1)),
        ]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer.clone());

        let report = handler
            .execute(&request(&["k1", "k2", "k1", "k3"]), Some(&caller("u")))
            .await
            .unwrap();

        assert_eq!(
            filenames(&report),
            vec![
                "k1_day_2024-01-01_to_2024-01-10.csv",
                "k2_no_data.txt",
                "k1_day_2024-01-01_to_2024-01-10.csv",
                "k3_day_2024-01-01_to_2024-01-10.csv",
            ]
        );
        assert_eq!(producer.calls().len(), 4);
    }

    #[tokio::test]
    async fn concurrent_fan_out_preserves_request_order() {
        let producer = Arc::new(MockProducer::new(&[
            ("slow", Scripted::Delay(Duration::from_millis(60))),
            ("medium", Scripted::Delay(Duration::from_millis(30))),
            ("fast", Scripted::Delay(Duration::from_millis(1))),
        ]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer.clone())
            .with_max_concurrent_reports(3);

        let report = handler
            .execute(&request(&["slow", "medium", "fast"]), None)
            .await
            .unwrap();

        let names = filenames(&report);
        assert!(names[0].starts_with("slow_"));
        assert!(names[1].starts_with("medium_"));
        assert!(names[2].starts_with("fast_"));
        assert!(producer.max_in_flight.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn concurrency_limit_of_one_is_sequential() {
        let producer = Arc::new(MockProducer::new(&[
            ("a", Scripted::Delay(Duration::from_millis(5))),
            ("b", Scripted::Delay(Duration::from_millis(5))),
            ("c", Scripted::Delay(Duration::from_millis(5))),
        ]));
        let handler = handler(MockResolver::with_workplaces(&["wp"]), producer.clone())
            .with_max_concurrent_reports(1);

        let report = handler.execute(&request(&["a", "b", "c"]), None).await.unwrap();

        assert_eq!(report.len(), 3);
        assert_eq!(producer.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_concurrency_is_clamped_to_one() {
        let producer = Arc::new(MockProducer::new(&[]));
        let handler = handler(MockResolver::with_workplaces(&[]), producer)
            .with_max_concurrent_reports(0);
        assert_eq!(handler.max_concurrent_reports, 1);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Access filtering
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn requested_filter_is_intersected_with_accessible_set() {
        let producer = Arc::new(MockProducer::new(&[("k", Scripted::Rows(1))]));
        let handler = handler(MockResolver::with_workplaces(&["a", "b", "c"]), producer.clone());
        let req = request(&["k"]).with_workplace_filter(ids(&["c", "d"]));

        let report = handler.execute(&req, Some(&caller("u"))).await.unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(producer.calls(), vec![("k".to_string(), ids(&["c"]))]);
    }

    #[tokio::test]
    async fn unfiltered_request_uses_every_accessible_workplace() {
        let producer = Arc::new(MockProducer::new(&[("k", Scripted::Rows(1))]));
        let handler = handler(MockResolver::with_workplaces(&["a", "b", "c"]), producer.clone());

        handler.execute(&request(&["k"]), Some(&caller("u"))).await.unwrap();

        assert_eq!(producer.calls(), vec![("k".to_string(), ids(&["a", "b", "c"]))]);
    }

    #[tokio::test]
    async fn fully_denied_filter_returns_empty_report_without_producing() {
        let producer = Arc::new(MockProducer::new(&[("k", Scripted::Rows(1))]));
        let handler = handler(MockResolver::with_workplaces(&["a", "b", "c"]), producer.clone());
        let req = request(&["k"]).with_workplace_filter(ids(&["d", "e"]));

        let report = handler.execute(&req, Some(&caller("u"))).await.unwrap();

        assert!(report.is_empty());
        assert!(producer.calls().is_empty());
    }

    #[tokio::test]
    async fn no_accessible_workplaces_returns_empty_report() {
        let producer = Arc::new(MockProducer::new(&[("k", Scripted::Rows(1))]));
        let handler = handler(MockResolver::with_workplaces(&[]), producer.clone());

        let report = handler.execute(&request(&["k"]), Some(&caller("u"))).await.unwrap();

        assert!(report.is_empty());
        assert!(producer.calls().is_empty());
    }

    #[tokio::test]
    async fn passes_caller_identity_to_resolver() {
        let resolver = Arc::new(MockResolver::with_workplaces(&["a"]));
        let producer = Arc::new(MockProducer::new(&[("k", Scripted::Rows(1))]));
        let handler = GenerateDashboardReportHandler::new(resolver.clone(), producer);

        handler.execute(&request(&["k"]), Some(&caller("user123"))).await.unwrap();
        handler.execute(&request(&["k"]), None).await.unwrap();

        assert_eq!(
            *resolver.seen_callers.lock().unwrap(),
            vec![Some("user123".to_string()), None]
        );
    }

    #[tokio::test]
    async fn resolver_failure_propagates_and_skips_producer() {
        let producer = Arc::new(MockProducer::new(&[("k", Scripted::Rows(1))]));
        let handler = handler(MockResolver::failing(), producer.clone());

        let result = handler.execute(&request(&["k"]), Some(&caller("u"))).await;

        assert!(matches!(result, Err(AccessResolutionError::Unavailable(_))));
        assert!(producer.calls().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fault isolation
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn failing_report_is_isolated_from_siblings() {
        let producer = Arc::new(MockProducer::new(&[
            ("k1", Scripted::Rows(1)),
            ("k2", Scripted::Fail),
            ("k3", Scripted::Rows(1)),
        ]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer);

        let report = handler.execute(&request(&["k1", "k2", "k3"]), None).await.unwrap();

        let files = report.files();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].content_kind(), ContentKind::Tabular);
        assert_eq!(files[1].filename(), "k2_error.txt");
        assert_eq!(files[1].content_kind(), ContentKind::Text);
        assert_eq!(files[2].content_kind(), ContentKind::Tabular);

        let text = files[1].content().as_text().unwrap();
        assert!(text.contains("k2"));
        assert!(text.contains("malformed query"));
    }

    #[tokio::test]
    async fn panicking_report_is_isolated_from_siblings() {
        let producer = Arc::new(MockProducer::new(&[
            ("ok", Scripted::Rows(1)),
            ("boom", Scripted::Panic),
        ]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer);

        let report = handler.execute(&request(&["boom", "ok"]), None).await.unwrap();

        assert_eq!(filenames(&report), vec!["boom_error.txt", "ok_day_2024-01-01_to_2024-01-10.csv"]);
        let text = report.files()[0].content().as_text().unwrap();
        assert!(text.contains("producer exploded"));
    }

    #[tokio::test]
    async fn empty_and_failed_reports_are_never_conflated() {
        let producer = Arc::new(MockProducer::new(&[
            ("quiet", Scripted::Empty),
            ("broken", Scripted::Fail),
        ]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer);

        let report = handler.execute(&request(&["quiet", "broken"]), None).await.unwrap();

        assert_eq!(filenames(&report), vec!["quiet_no_data.txt", "broken_error.txt"]);
        let quiet = report.files()[0].content().as_text().unwrap();
        assert!(quiet.contains("No data found for report 'quiet'"));
    }

    #[tokio::test]
    async fn unknown_report_key_yields_no_data_file_naming_the_key() {
        let producer = Arc::new(MockProducer::new(&[]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer);

        let report = handler.execute(&request(&["activty_summary"]), None).await.unwrap();

        let file = &report.files()[0];
        assert_eq!(file.filename(), "activty_summary_no_data.txt");
        assert!(file
            .content()
            .as_text()
            .unwrap()
            .contains("'activty_summary' is not recognized"));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Output model
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn tabular_filename_is_deterministic() {
        let producer = Arc::new(MockProducer::new(&[("activity_summary", Scripted::Rows(3))]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer);

        let report = handler.execute(&request(&["activity_summary"]), None).await.unwrap();

        let file = &report.files()[0];
        assert_eq!(file.filename(), "activity_summary_day_2024-01-01_to_2024-01-10.csv");
        assert_eq!(file.content().as_rows().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn request_is_not_modified_by_execution() {
        let producer = Arc::new(MockProducer::new(&[("k", Scripted::Rows(1))]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer);
        let req = request(&["k"]).with_workplace_filter(ids(&["a", "zzz"]));
        let before = req.clone();

        handler.execute(&req, None).await.unwrap();

        assert_eq!(req, before);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cancellation
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn cancelling_execution_aborts_the_whole_aggregation() {
        let producer = Arc::new(MockProducer::new(&[
            ("done", Scripted::Rows(1)),
            ("stuck", Scripted::Hang),
        ]));
        let handler = handler(MockResolver::with_workplaces(&["a"]), producer.clone());
        let req = request(&["done", "stuck"]);

        let result =
            tokio::time::timeout(Duration::from_millis(50), handler.execute(&req, None)).await;

        assert!(result.is_err());
        assert_eq!(producer.calls().len(), 2);
    }
}
