//! Output model of the aggregation: rows, files, and the aggregated report.
//!
//! The serialization edge consumes these types. Tabular content is an ordered
//! list of rows sharing a key set; the first row's field order defines the
//! column order of any tabular rendering.

use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::period::Period;
use crate::domain::foundation::ReportKey;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Text(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Integer(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Text(s) => write!(f, "{}", s),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Float(x) => write!(f, "{}", x),
            ScalarValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// One row of tabular report data: field name to scalar, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    fields: Vec<(String, ScalarValue)>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Replaces the value if `name` is already present,
    /// keeping its original position.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ScalarValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Field names in column order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ReportRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = ReportRow;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of field names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ReportRow, A::Error> {
                let mut row = ReportRow::new();
                while let Some((name, value)) = access.next_entry::<String, ScalarValue>()? {
                    row.insert(name, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Discriminant of [`ReportContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Tabular,
    Text,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Tabular => "tabular",
            ContentKind::Text => "text",
        }
    }
}

/// Content of one output file: tabular rows or a plain-text diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "content_kind", content = "content", rename_all = "snake_case")]
pub enum ReportContent {
    Tabular(Vec<ReportRow>),
    Text(String),
}

impl ReportContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            ReportContent::Tabular(_) => ContentKind::Tabular,
            ReportContent::Text(_) => ContentKind::Text,
        }
    }

    pub fn as_rows(&self) -> Option<&[ReportRow]> {
        match self {
            ReportContent::Tabular(rows) => Some(rows.as_slice()),
            ReportContent::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReportContent::Tabular(_) => None,
            ReportContent::Text(text) => Some(text.as_str()),
        }
    }
}

/// One named unit of report output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutputFile {
    filename: String,
    #[serde(flatten)]
    content: ReportContent,
}

impl ReportOutputFile {
    /// Tabular data file for a report that produced rows.
    pub fn tabular(
        report_key: &ReportKey,
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
        rows: Vec<ReportRow>,
    ) -> Self {
        Self {
            filename: tabular_filename(report_key, period, start, end),
            content: ReportContent::Tabular(rows),
        }
    }

    /// Text file stating that a report produced no rows.
    pub fn no_data(report_key: &ReportKey, message: impl Into<String>) -> Self {
        Self {
            filename: no_data_filename(report_key),
            content: ReportContent::Text(message.into()),
        }
    }

    /// Text file describing a report that failed to generate.
    pub fn error(report_key: &ReportKey, message: impl Into<String>) -> Self {
        Self {
            filename: error_filename(report_key),
            content: ReportContent::Text(message.into()),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &ReportContent {
        &self.content
    }

    pub fn content_kind(&self) -> ContentKind {
        self.content.kind()
    }
}

/// `{report_key}_{period}_{start}_to_{end}.csv` with ISO-8601 dates.
pub fn tabular_filename(
    report_key: &ReportKey,
    period: Period,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    format!(
        "{}_{}_{}_to_{}.csv",
        report_key,
        period.as_str(),
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

/// `{report_key}_no_data.txt`
pub fn no_data_filename(report_key: &ReportKey) -> String {
    format!("{}_no_data.txt", report_key)
}

/// `{report_key}_error.txt`
pub fn error_filename(report_key: &ReportKey) -> String {
    format!("{}_error.txt", report_key)
}

/// The aggregation's sole output: one file per processed report key, in
/// request order. Empty when access filtering left nothing to report on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedReport {
    files: Vec<ReportOutputFile>,
}

impl AggregatedReport {
    pub fn new(files: Vec<ReportOutputFile>) -> Self {
        Self { files }
    }

    /// Report with no files (no accessible workplaces for the request).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[ReportOutputFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<ReportOutputFile> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
