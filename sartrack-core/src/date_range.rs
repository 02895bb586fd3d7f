//! Inclusive date range for calendar queries.

use chrono::{Duration, NaiveDate};

use crate::error::SarResult;
use crate::ingest::parse_date;

/// Days covered by a range when no end date is given.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange { from, to }
    }

    /// Build a range from optional YYYY-MM-DD arguments.
    /// - `from`: defaults to `today`
    /// - `to`: defaults to `from` + DEFAULT_RANGE_DAYS
    pub fn from_args(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> SarResult<Self> {
        let from = match from {
            Some(s) => parse_date(s)?,
            None => today,
        };

        let to = match to {
            Some(s) => parse_date(s)?,
            None => from + Duration::days(DEFAULT_RANGE_DAYS),
        };

        Ok(DateRange { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}
