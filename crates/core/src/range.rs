//! Date ranges for trend queries.
//!
//! The daily history is always bounded by the selected range. Ranges longer than
//! [`MONTHLY_THRESHOLD_DAYS`] additionally load the monthly aggregate.

use crate::constants::{DEFAULT_RANGE_MONTHS, MONTHLY_THRESHOLD_DAYS, QUERY_DATE_FORMAT};
use crate::{CoreError, CoreResult};
use chrono::{Months, NaiveDate};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns `InvertedRange` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The last twelve months ending on `today`.
    pub fn default_ending(today: NaiveDate) -> Self {
        let start = today
            .checked_sub_months(Months::new(DEFAULT_RANGE_MONTHS))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Build a range from optional `YYYY-MM-DD` bounds, defaulting to the last year.
    pub fn from_bounds(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> CoreResult<Self> {
        let end = end.map(parse_query_date).transpose()?.unwrap_or(today);
        match start {
            Some(s) => Self::new(parse_query_date(s)?, end),
            None => Ok(Self::default_ending(end)),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whole days between the bounds.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether the monthly aggregate should be loaded alongside the daily history.
    pub fn wants_monthly(&self) -> bool {
        self.span_days() > MONTHLY_THRESHOLD_DAYS
    }

    /// Query parameters for the history endpoint.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format(QUERY_DATE_FORMAT).to_string()),
            ("end_date", self.end.format(QUERY_DATE_FORMAT).to_string()),
        ]
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

pub fn parse_query_date(raw: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), QUERY_DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_query_date(s).unwrap()
    }

    #[test]
    fn exactly_ninety_days_stays_daily() {
        let range = DateRange::new(d("2024-01-01"), d("2024-03-31")).unwrap();
        assert_eq!(range.span_days(), 90);
        assert!(!range.wants_monthly());
    }

    #[test]
    fn ninety_one_days_loads_monthly() {
        let range = DateRange::new(d("2024-01-01"), d("2024-04-01")).unwrap();
        assert_eq!(range.span_days(), 91);
        assert!(range.wants_monthly());
    }

    #[test]
    fn default_range_is_last_year() {
        let range = DateRange::default_ending(d("2025-02-28"));
        assert_eq!(range.start(), d("2024-02-28"));
        assert!(range.wants_monthly());
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            DateRange::new(d("2024-02-01"), d("2024-01-01")),
            Err(CoreError::InvertedRange { .. })
        ));
    }

    #[test]
    fn from_bounds_defaults_and_parses() {
        let today = d("2024-06-30");
        let range = DateRange::from_bounds(Some("2024-06-01"), None, today).unwrap();
        assert_eq!(range.end(), today);
        assert!(!range.wants_monthly());

        let defaulted = DateRange::from_bounds(None, Some("2024-03-15"), today).unwrap();
        assert_eq!(defaulted.start(), d("2023-03-15"));

        assert!(DateRange::from_bounds(Some("06/01/2024"), None, today).is_err());
    }

    #[test]
    fn query_pairs_use_iso_dates() {
        let range = DateRange::new(d("2024-01-05"), d("2024-02-05")).unwrap();
        let pairs = range.query_pairs();
        assert_eq!(pairs[0], ("start_date", "2024-01-05".to_string()));
        assert_eq!(pairs[1], ("end_date", "2024-02-05".to_string()));
    }
}
