//! Report period granularity.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Granularity at which a report's time axis is stepped.
///
/// Stepping is additive with a fixed day count per period (a "month" is
/// 30 days, a "year" 365), not calendar aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    /// Parses a period name, falling back to `Month` for anything unrecognized.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Period::Day,
            "week" => Period::Week,
            "month" => Period::Month,
            "year" => Period::Year,
            _ => Period::Month,
        }
    }

    /// Wire name used in filenames and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Number of days one step of this period advances.
    pub fn step_days(&self) -> u64 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
            Period::Year => 365,
        }
    }

    /// Advances `date` by one step. Returns `None` past the end of the
    /// representable calendar.
    pub fn step(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_add_days(Days::new(self.step_days()))
    }

    /// Iterates the step dates `start, start + step, ...` while `<= end`.
    ///
    /// Yields nothing when `start > end`.
    pub fn steps(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let period = *self;
        std::iter::successors(Some(start), move |current| period.step(*current))
            .take_while(move |date| *date <= end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Period {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}
