use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, InsightResult};

/// Inclusive calendar-day range. Construction validates that `end` is not
/// before `start`; a reversed range is rejected, never swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> InsightResult<Self> {
        if end < start {
            return Err(InsightError::InvalidDateRange(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from ISO `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> InsightResult<Self> {
        let start = parse_iso_date(start)?;
        let end = parse_iso_date(end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days in the range, inclusive of both endpoints.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every calendar day from start to end inclusive, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

fn parse_iso_date(s: &str) -> InsightResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| InsightError::InvalidDateRange(format!("not an ISO calendar date: {s:?}")))
}

/// Reporting granularity for an assembled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Week,
}

/// One aligned observation of the two compared metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

/// Classified strength of a correlation, by `|r|` thresholds with a
/// positive/negative suffix from the sign of `r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLabel {
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    None,
    WeakNegative,
    ModerateNegative,
    StrongNegative,
}

/// Complete outcome of one correlation query. Request-scoped; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub points: Vec<CorrelationPoint>,
    pub pearson_r: f64,
    pub p_value: f64,
    pub slope: f64,
    pub intercept: f64,
    pub interpretation: StrengthLabel,
    pub interpretation_text: String,
}
