//! HTTP routes for the export endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{export_dashboard_data, ExportAppState};
use crate::adapters::http::middleware::{api_key_middleware, ApiKeyState};
use crate::adapters::reports::producer_stack;
use crate::application::handlers::GenerateDashboardReportHandler;
use crate::config::{AppConfig, ValidationError};
use crate::ports::{DistributedLock, ReportCache, ReportExporter, ReportProducer, WorkplaceResolver};

/// Path of the export endpoint.
pub const EXPORT_PATH: &str = "/dashboard/data/exporter";

/// Creates the export router.
///
/// Every route requires a valid API key. Requests running longer than
/// `request_timeout` are answered with 408 and their aggregation is dropped.
pub fn export_routes(state: ExportAppState, api_key: ApiKeyState, request_timeout: Duration) -> Router {
    Router::new()
        // GET /dashboard/data/exporter
        .route(EXPORT_PATH, get(export_dashboard_data))
        .route_layer(middleware::from_fn_with_state(api_key, api_key_middleware))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the export router from application configuration.
///
/// `base_producer` is wrapped per `config.reports`; `cache` and `lock` are
/// only used when caching is enabled there.
///
/// # Errors
///
/// Returns `ValidationError` if `config` does not validate.
pub fn export_app(
    config: &AppConfig,
    resolver: Arc<dyn WorkplaceResolver>,
    base_producer: Arc<dyn ReportProducer>,
    exporter: Arc<dyn ReportExporter>,
    cache: Option<Arc<dyn ReportCache>>,
    lock: Option<Arc<dyn DistributedLock>>,
) -> Result<Router, ValidationError> {
    config.validate()?;

    let producer = producer_stack(base_producer, &config.reports, cache, lock);
    let handler = GenerateDashboardReportHandler::new(resolver, producer)
        .with_max_concurrent_reports(config.reports.max_concurrent_reports);
    let state = ExportAppState::new(Arc::new(handler), exporter)
        .with_default_lookback_days(config.reports.default_lookback_days);
    let api_key = ApiKeyState::from_config(&config.auth)?;

    info!(
        max_concurrent_reports = config.reports.max_concurrent_reports,
        default_lookback_days = config.reports.default_lookback_days,
        request_timeout_secs = config.server.request_timeout_secs,
        "Export routes configured"
    );
    Ok(export_routes(state, api_key, config.server.request_timeout()))
}
