//! Sample report producer.
//!
//! Generates deterministic time-series rows for three demo reports:
//!
//! | key                  | columns                                                          |
//! |----------------------|------------------------------------------------------------------|
//! | `activity_summary`   | date, workplace_id, visits, new_memberships                      |
//! | `item_statistics`    | date, workplace_id, items_loaned, items_returned                 |
//! | `financial_overview` | date, workplace_id, revenue_books_usd, revenue_events_usd, late_fees_usd |
//!
//! Rows step from the request start by the period's day count while the date
//! is not past the end. Within each date step there is one row per workplace
//! in the request filter, in filter order.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::domain::foundation::{ReportKey, WorkplaceId};
use crate::domain::report::{ReportRequest, ReportRow};
use crate::ports::{ProducerError, ReportData, ReportProducer};

/// Report keys this producer recognizes.
pub const SAMPLE_REPORT_KEYS: [&str; 3] = ["activity_summary", "item_statistics", "financial_overview"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleReport {
    ActivitySummary,
    ItemStatistics,
    FinancialOverview,
}

impl SampleReport {
    fn from_key(key: &ReportKey) -> Option<Self> {
        match key.as_str() {
            "activity_summary" => Some(Self::ActivitySummary),
            "item_statistics" => Some(Self::ItemStatistics),
            "financial_overview" => Some(Self::FinancialOverview),
            _ => None,
        }
    }

    fn row(self, date: NaiveDate, workplace_id: &WorkplaceId) -> ReportRow {
        let day = i64::from(date.day());
        let row = ReportRow::new()
            .with("date", date.format("%Y-%m-%d").to_string())
            .with("workplace_id", workplace_id.as_str());

        match self {
            Self::ActivitySummary => row
                .with("visits", 100 + (day % 10) * 10)
                .with("new_memberships", 5 + day % 5),
            Self::ItemStatistics => row
                .with("items_loaned", 500 + (day % 20) * 5)
                .with("items_returned", 480 + (day % 20) * 4),
            Self::FinancialOverview => {
                let day = day as f64;
                row.with("revenue_books_usd", 1000.0 + (day % 10.0) * 100.0)
                    .with("revenue_events_usd", 200.0 + (day % 5.0) * 20.0)
                    .with("late_fees_usd", 50.0 + (day % 7.0) * 5.0)
            }
        }
    }
}

/// ReportProducer serving deterministic demo data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleReportProducer;

impl SampleReportProducer {
    pub fn new() -> Self {
        Self
    }

    fn rows(report: SampleReport, request: &ReportRequest) -> Vec<ReportRow> {
        request
            .period()
            .steps(request.start(), request.end())
            .flat_map(|date| {
                request
                    .workplace_filter()
                    .iter()
                    .map(move |workplace_id| report.row(date, workplace_id))
            })
            .collect()
    }
}

#[async_trait]
impl ReportProducer for SampleReportProducer {
    async fn produce(
        &self,
        report_key: &ReportKey,
        request: &ReportRequest,
    ) -> Result<ReportData, ProducerError> {
        let Some(report) = SampleReport::from_key(report_key) else {
            return Ok(ReportData::UnknownReport);
        };
        Ok(ReportData::from_rows(Self::rows(report, request)))
    }
}
