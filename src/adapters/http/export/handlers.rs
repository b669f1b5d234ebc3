//! HTTP handlers for the export endpoint.
//!
//! These handlers connect the Axum route to the report aggregation handler
//! and the configured exporter.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use crate::adapters::http::middleware::ApiCaller;
use crate::application::handlers::GenerateDashboardReportHandler;
use crate::domain::foundation::{ReportKey, ValidationError, WorkplaceId};
use crate::domain::report::{default_start, Period, ReportRequest, DEFAULT_LOOKBACK_DAYS};
use crate::ports::{AccessResolutionError, ExportError, ReportExporter};

use super::dto::{ErrorResponse, ExportParams};

/// Message returned when aggregation produced no files at all.
pub const NO_DATA_MESSAGE: &str = "No data found for the requested reports or parameters.";

// ════════════════════════════════════════════════════════════════════════════════
// Error Type
// ════════════════════════════════════════════════════════════════════════════════

/// Export API error that implements IntoResponse.
#[derive(Debug)]
pub enum ExportApiError {
    BadRequest(String),
    NotFound(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl IntoResponse for ExportApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ExportApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            ExportApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
            ExportApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::service_unavailable(msg),
            ),
            ExportApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal(msg))
            }
        };
        (status, Json(error)).into_response()
    }
}

impl From<ValidationError> for ExportApiError {
    fn from(error: ValidationError) -> Self {
        ExportApiError::BadRequest(error.to_string())
    }
}

impl From<AccessResolutionError> for ExportApiError {
    fn from(error: AccessResolutionError) -> Self {
        ExportApiError::ServiceUnavailable(format!("Could not resolve workplace access: {}", error))
    }
}

impl From<ExportError> for ExportApiError {
    fn from(error: ExportError) -> Self {
        ExportApiError::Internal(error.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the export route.
#[derive(Clone)]
pub struct ExportAppState {
    pub report_handler: Arc<GenerateDashboardReportHandler>,
    pub exporter: Arc<dyn ReportExporter>,
    pub default_lookback_days: u64,
}

impl ExportAppState {
    pub fn new(report_handler: Arc<GenerateDashboardReportHandler>, exporter: Arc<dyn ReportExporter>) -> Self {
        Self {
            report_handler,
            exporter,
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_default_lookback_days(mut self, days: u64) -> Self {
        self.default_lookback_days = days;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Request Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Builds a validated report request from query parameters, filling in the
/// date defaults relative to `today`.
pub fn build_request(
    params: &ExportParams,
    today: NaiveDate,
    lookback_days: u64,
) -> Result<ReportRequest, ExportApiError> {
    let report_keys = params
        .report_keys()
        .into_iter()
        .map(ReportKey::new)
        .collect::<Result<Vec<_>, _>>()?;
    if report_keys.is_empty() {
        return Err(ExportApiError::BadRequest(
            "At least one report key must be provided in 'reports'".to_string(),
        ));
    }

    let workplace_ids = params
        .workplace_ids()
        .into_iter()
        .map(WorkplaceId::new)
        .collect::<Result<Vec<_>, _>>()?;

    let end = params.end_date.unwrap_or(today);
    let start = params
        .start_date
        .unwrap_or_else(|| default_start(today, lookback_days));
    let period = params
        .period
        .as_deref()
        .map(Period::parse_lenient)
        .unwrap_or_default();

    Ok(ReportRequest::new(report_keys, start, end)?
        .with_period(period)
        .with_workplace_filter(workplace_ids))
}

/// `dashboard_export_YYYYMMDD.<ext>`
pub fn export_filename(today: NaiveDate, extension: &str) -> String {
    format!("dashboard_export_{}.{}", today.format("%Y%m%d"), extension)
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /dashboard/data/exporter
///
/// Generates the requested reports for the caller's accessible workplaces and
/// returns them as a single downloadable bundle.
pub async fn export_dashboard_data(
    State(state): State<ExportAppState>,
    ApiCaller(caller): ApiCaller,
    Query(params): Query<ExportParams>,
) -> Result<Response, ExportApiError> {
    let today = Utc::now().date_naive();
    let request = build_request(&params, today, state.default_lookback_days)?;

    let report = state
        .report_handler
        .execute(&request, caller.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Workplace access resolution failed");
            ExportApiError::from(e)
        })?;

    if report.is_empty() {
        info!("Export produced no files");
        return Err(ExportApiError::NotFound(NO_DATA_MESSAGE.to_string()));
    }

    let body = state.exporter.export(&report)?;
    let filename = export_filename(today, state.exporter.file_extension());
    info!(files = report.len(), bytes = body.len(), filename = %filename, "Export ready");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, state.exporter.media_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params(reports: &str) -> ExportParams {
        ExportParams {
            reports: reports.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_cover_lookback_window_ending_today() {
        let request = build_request(&params("activity_summary"), date(2024, 6, 30), 365).unwrap();

        assert_eq!(request.end(), date(2024, 6, 30));
        assert_eq!(request.start(), date(2023, 7, 1));
        assert_eq!(request.period(), Period::Month);
        assert!(request.is_unfiltered());
    }

    #[test]
    fn explicit_values_are_used() {
        let params = ExportParams {
            workplace_ids: Some("wp1, wp3".to_string()),
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 1, 31)),
            period: Some("week".to_string()),
            reports: "activity_summary,item_statistics".to_string(),
        };

        let request = build_request(&params, date(2024, 6, 30), 365).unwrap();

        assert_eq!(request.start(), date(2024, 1, 1));
        assert_eq!(request.end(), date(2024, 1, 31));
        assert_eq!(request.period(), Period::Week);
        assert_eq!(
            request.workplace_filter(),
            &[WorkplaceId::new("wp1").unwrap(), WorkplaceId::new("wp3").unwrap()]
        );
        assert_eq!(request.report_keys().len(), 2);
    }

    #[test]
    fn unknown_period_falls_back_to_month() {
        let params = ExportParams {
            period: Some("fortnight".to_string()),
            ..params("k")
        };
        let request = build_request(&params, date(2024, 6, 30), 365).unwrap();
        assert_eq!(request.period(), Period::Month);
    }

    #[test]
    fn blank_reports_are_rejected() {
        let result = build_request(&params(" , "), date(2024, 6, 30), 365);
        assert!(matches!(result, Err(ExportApiError::BadRequest(_))));
    }

    #[test]
    fn export_filename_uses_compact_date() {
        assert_eq!(export_filename(date(2024, 3, 7), "zip"), "dashboard_export_20240307.zip");
    }

    #[test]
    fn resolution_error_maps_to_service_unavailable() {
        let error = ExportApiError::from(AccessResolutionError::Timeout);
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
