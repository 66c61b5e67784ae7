//! Reporting windows.
//!
//! A [`Period`] names a span of days; a [`TimeWindow`] anchors that span at a
//! given instant and also exposes the equally long window just before it, which
//! growth comparisons use as their baseline.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Period {
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
    /// Last 30 days
    #[default]
    Month,
    /// Last 90 days
    Quarter,
    /// Last 365 days
    Year,
}

impl Period {
    /// Number of days covered by the period.
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    /// Span of the period as a duration
    #[must_use]
    pub const fn span(self) -> Duration {
        Duration::days(self.days())
    }

    /// Lower-case name used in configuration and on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// Parses a period name; anything unrecognised falls back to a month.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Self::Day,
            "week" => Self::Week,
            "quarter" => Self::Quarter,
            "year" => Self::Year,
            _ => Self::Month,
        }
    }
}

impl From<String> for Period {
    fn from(value: String) -> Self {
        Self::parse_or_default(&value)
    }
}

impl FromStr for Period {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_or_default(s))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A period anchored at a specific instant.
///
/// The current window is `[current_start, now]` and the previous window is
/// `[previous_start, current_start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    /// Period the window was built from
    pub period: Period,
    /// Anchor instant
    pub now: DateTime<Utc>,
    /// Start of the current window
    pub current_start: DateTime<Utc>,
    /// Start of the previous window
    pub previous_start: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds the window that ends at `now`.
    #[must_use]
    pub fn ending_at(period: Period, now: DateTime<Utc>) -> Self {
        let span = period.span();
        Self {
            period,
            now,
            current_start: now - span,
            previous_start: now - span - span,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_days() {
        assert_eq!(Period::Day.days(), 1);
        assert_eq!(Period::Week.days(), 7);
        assert_eq!(Period::Month.days(), 30);
        assert_eq!(Period::Quarter.days(), 90);
        assert_eq!(Period::Year.days(), 365);
    }

    #[test]
    fn test_parse_unknown_period_defaults_to_month() {
        assert_eq!(Period::parse_or_default("fortnight"), Period::Month);
        assert_eq!(Period::parse_or_default(""), Period::Month);
        assert_eq!(Period::parse_or_default(" Quarter "), Period::Quarter);
        assert_eq!("year".parse::<Period>().unwrap(), Period::Year);
    }

    #[test]
    fn test_window_boundaries() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let window = TimeWindow::ending_at(Period::Week, now);

        assert_eq!(
            window.current_start,
            Utc.with_ymd_and_hms(2024, 3, 24, 12, 0, 0).unwrap()
        );
        assert_eq!(
            window.previous_start,
            Utc.with_ymd_and_hms(2024, 3, 17, 12, 0, 0).unwrap()
        );
        assert_eq!(window.period, Period::Week);
    }
}
