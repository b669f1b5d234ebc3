//! Report producer port - raw tabular data for one report.
//!
//! The aggregation handler calls the producer once per requested report key
//! with a request already restricted to the caller's accessible workplaces.
//!
//! # Contract
//!
//! - `Rows` for a recognized key with data.
//! - `Empty` for a recognized key with no rows in the window/filter. This is
//!   not an error.
//! - `UnknownReport` when the key is not recognized, so callers can tell a
//!   mistyped key from a quiet period.
//! - `Err(ProducerError)` only for genuine backend failures. The caller
//!   isolates these per key.
//!
//! Implementations receive the request by shared reference and cannot
//! mutate it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::ReportKey;
use crate::domain::report::{ReportRequest, ReportRow};

/// Port for producing report data.
#[async_trait]
pub trait ReportProducer: Send + Sync {
    /// Produces the rows of `report_key` for `request`.
    async fn produce(
        &self,
        report_key: &ReportKey,
        request: &ReportRequest,
    ) -> Result<ReportData, ProducerError>;
}

/// Successful producer outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ReportData {
    /// At least one row of data.
    Rows(Vec<ReportRow>),
    /// Recognized report, nothing in range.
    Empty,
    /// Report key not recognized by this producer.
    UnknownReport,
}

impl ReportData {
    /// Wraps `rows`, normalizing an empty vector to `Empty`.
    pub fn from_rows(rows: Vec<ReportRow>) -> Self {
        if rows.is_empty() {
            ReportData::Empty
        } else {
            ReportData::Rows(rows)
        }
    }

    pub fn has_rows(&self) -> bool {
        matches!(self, ReportData::Rows(rows) if !rows.is_empty())
    }
}

/// Backend failure while producing a single report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProducerError {
    #[error("Report backend unavailable: {0}")]
    Unavailable(String),

    #[error("Report query failed: {0}")]
    QueryFailed(String),

    #[error("Report '{report_key}' timed out after {}ms", .after.as_millis())]
    Timeout { report_key: String, after: Duration },
}
