use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

/// Calendar dates are plain `NaiveDate` values: no time of day, no timezone.
pub type CalendarDate = NaiveDate;

/// Wire format used for dates at every boundary of the crate.
pub const DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date '{0}' must be 8 digits in YYYYMMDD form")]
    Format(String),
    #[error("date '{0}' is not a valid calendar date")]
    Calendar(String),
}

/// Parse a `YYYYMMDD` string into a calendar date.
///
/// Only exactly eight ASCII digits are accepted, and the year must be at
/// least 1. `format_date(parse_date(s)?)` always gives back `s`.
pub fn parse_date(text: &str) -> Result<NaiveDate, DateError> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::Format(text.to_string()));
    }

    let field = |range: std::ops::Range<usize>| -> Result<u32, DateError> {
        text[range]
            .parse::<u32>()
            .map_err(|_| DateError::Format(text.to_string()))
    };
    let year = field(0..4)?;
    let month = field(4..6)?;
    let day = field(6..8)?;

    if year == 0 {
        return Err(DateError::Calendar(text.to_string()));
    }

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| DateError::Calendar(text.to_string()))
}

/// Format a calendar date as `YYYYMMDD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Number of days in the given month, honouring leap years.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    last_day_of_month(year, month).map_or(0, |date| date.day())
}

/// Helper: Find the last day of a month
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.checked_sub_days(Days::new(1))
}

/// Helper: The (year, month) pair that follows `(year, month)`
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
