//! Report domain - request parameters, period stepping, and the output model.

mod output;
mod period;
mod request;

pub use output::{
    error_filename, no_data_filename, tabular_filename, AggregatedReport, ContentKind,
    ReportContent, ReportOutputFile, ReportRow, ScalarValue,
};
pub use period::Period;
pub use request::{default_start, ReportRequest, DEFAULT_LOOKBACK_DAYS};
