//! ReportRequest - caller-supplied parameters for a dashboard report.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::period::Period;
use crate::domain::foundation::{ReportKey, ValidationError, WorkplaceId};

/// Default look-back window when the caller omits a start date.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 365;

/// Parameters of a single report request.
///
/// Immutable once constructed. The aggregation handler never edits a request
/// in place; it derives a copy restricted to the reconciled workplace list via
/// [`ReportRequest::restricted_to`].
///
/// `start <= end` is expected but deliberately not enforced here; an inverted
/// window simply produces no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    workplace_filter: Vec<WorkplaceId>,
    start: NaiveDate,
    end: NaiveDate,
    period: Period,
    report_keys: Vec<ReportKey>,
}

impl ReportRequest {
    /// Creates a request for the given reports over an explicit window.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyCollection` if `report_keys` is empty.
    pub fn new(
        report_keys: Vec<ReportKey>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if report_keys.is_empty() {
            return Err(ValidationError::empty_collection("reports"));
        }
        Ok(Self {
            workplace_filter: Vec::new(),
            start,
            end,
            period: Period::default(),
            report_keys,
        })
    }

    /// Creates a request whose window ends on `today` and starts
    /// `lookback_days` earlier.
    pub fn ending_on(
        report_keys: Vec<ReportKey>,
        today: NaiveDate,
        lookback_days: u64,
    ) -> Result<Self, ValidationError> {
        let start = default_start(today, lookback_days);
        Self::new(report_keys, start, today)
    }

    /// Restricts the request to the given workplaces. An empty list means
    /// "no filter": every accessible workplace is used.
    pub fn with_workplace_filter(mut self, workplace_ids: Vec<WorkplaceId>) -> Self {
        self.workplace_filter = workplace_ids;
        self
    }

    /// Sets the period granularity.
    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    /// Derives a copy of this request whose workplace filter is replaced by
    /// `workplace_ids`. Every other field passes through unchanged.
    pub fn restricted_to(&self, workplace_ids: Vec<WorkplaceId>) -> Self {
        Self {
            workplace_filter: workplace_ids,
            ..self.clone()
        }
    }

    pub fn workplace_filter(&self) -> &[WorkplaceId] {
        &self.workplace_filter
    }

    /// True when the caller did not narrow the request to specific workplaces.
    pub fn is_unfiltered(&self) -> bool {
        self.workplace_filter.is_empty()
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn report_keys(&self) -> &[ReportKey] {
        &self.report_keys
    }
}

/// Start date `lookback_days` before `today`, clamped to the earliest
/// representable date.
pub fn default_start(today: NaiveDate, lookback_days: u64) -> NaiveDate {
    today
        .checked_sub_days(Days::new(lookback_days))
        .unwrap_or(NaiveDate::MIN)
}
