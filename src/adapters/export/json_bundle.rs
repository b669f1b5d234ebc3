//! JSON bundle exporter.
//!
//! Renders an aggregated report as a single JSON document:
//!
//! ```json
//! { "files": [ { "filename": "...", "content_kind": "tabular", "content": [ { ... } ] } ] }
//! ```
//!
//! Tabular rows keep their column order; text files carry the message string.

use crate::domain::report::AggregatedReport;
use crate::ports::{ExportError, ReportExporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBundleExporter {
    pretty: bool,
}

impl JsonBundleExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output for human readers.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ReportExporter for JsonBundleExporter {
    fn media_type(&self) -> &'static str {
        "application/json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn export(&self, report: &AggregatedReport) -> Result<Vec<u8>, ExportError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(report)
        } else {
            serde_json::to_vec(report)
        };
        encoded.map_err(|e| ExportError::Encoding {
            filename: failing_file(report).unwrap_or("bundle").to_string(),
            reason: e.to_string(),
        })
    }
}

/// First file that cannot be encoded on its own, for error attribution.
fn failing_file(report: &AggregatedReport) -> Option<&str> {
    report
        .files()
        .iter()
        .find(|file| serde_json::to_vec(file).is_err())
        .map(|file| file.filename())
}
