//! Report exporter port - serializes an aggregated report for transport.
//!
//! Archive formats (ZIP of CSVs, JSON bundles, ...) live behind this port so
//! the HTTP edge stays format-agnostic.

use thiserror::Error;

use crate::domain::report::AggregatedReport;

/// Port for turning an [`AggregatedReport`] into a downloadable payload.
pub trait ReportExporter: Send + Sync {
    /// MIME type of the exported payload.
    fn media_type(&self) -> &'static str;

    /// File extension (without dot) for the download filename.
    fn file_extension(&self) -> &'static str;

    /// Serializes every file of `report` into one payload.
    fn export(&self, report: &AggregatedReport) -> Result<Vec<u8>, ExportError>;
}

/// Errors raised while exporting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Failed to encode report file '{filename}': {reason}")]
    Encoding { filename: String, reason: String },
}
