//! Strongly-typed identifiers for the reporting domain.
//!
//! All identifiers are opaque strings owned by external systems (the
//! workplace directory, the API key registry, the report catalogue), so they
//! are only checked for emptiness and surrounding whitespace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ValidationError;

fn non_blank(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if trimmed.len() != value.len() {
        return Ok(trimmed.to_string());
    }
    Ok(value)
}

/// Identifier of an access-scoped workplace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkplaceId(String);

impl WorkplaceId {
    /// Creates a new WorkplaceId, returning error if blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        non_blank("workplace_id", id.into()).map(Self)
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkplaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkplaceId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identity of the caller requesting a report.
///
/// Absence of a caller (`Option<CallerId>::None`) is meaningful: it selects
/// the resolver's anonymous/system access set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    /// Creates a new CallerId, returning error if blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        non_blank("caller_id", id.into()).map(Self)
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key selecting which report generation logic to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportKey(String);

impl ReportKey {
    /// Creates a new ReportKey, returning error if blank.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        non_blank("report_key", key.into()).map(Self)
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
