//! HTTP DTOs for the export endpoint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query parameters for `GET /dashboard/data/exporter`.
///
/// List parameters are comma-separated; entries are trimmed and blank entries
/// dropped. Dates are ISO-8601 (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    /// Comma-separated workplace ids; absent or empty means every accessible workplace.
    pub workplace_ids: Option<String>,
    /// Defaults to today minus the configured look-back.
    pub start_date: Option<NaiveDate>,
    /// Defaults to today.
    pub end_date: Option<NaiveDate>,
    /// `day`, `week`, `month` or `year`; anything else means `month`.
    pub period: Option<String>,
    /// Comma-separated report keys. Required.
    pub reports: String,
}

impl ExportParams {
    pub fn report_keys(&self) -> Vec<&str> {
        split_list(&self.reports)
    }

    pub fn workplace_ids(&self) -> Vec<&str> {
        self.workplace_ids.as_deref().map(split_list).unwrap_or_default()
    }
}

/// Splits a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code("BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code("NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_code("UNAUTHORIZED", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::with_code("SERVICE_UNAVAILABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code("INTERNAL_ERROR", message)
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn with_code(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}
