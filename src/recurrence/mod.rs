//! Recurrence rules and the successor engine that advances a task's date.
//!
//! Rules arrive as short text (`d 7`, `y`, `w 1,3`, `m -1 1,6`) and are
//! decoded by [`parse`] into a [`RecurrenceRule`]. [`next_occurrence`] then
//! answers "when does this task next occur" for an anchor date and a
//! reference date.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod parser;
pub mod successor;

pub use parser::{parse, validate};
pub use successor::{ComputeError, ScheduleQuery, next_occurrence};

pub const MIN_INTERVAL_DAYS: u32 = 1;
pub const MAX_INTERVAL_DAYS: u32 = 400;

/// Selector meaning "last day of the month".
pub const LAST_DAY: i32 = -1;
/// Selector meaning "second-to-last day of the month".
pub const SECOND_TO_LAST_DAY: i32 = -2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed repeat rule: {0}")]
    Malformed(String),
    #[error("unknown repeat rule '{0}'")]
    UnknownRule(String),
    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },
}

/// How a task repeats. A task without a rule is a one-shot task and carries
/// `Option::None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecurrenceRule {
    /// Every `n` days, `n` in 1..=400.
    Daily(u32),
    /// Every year on the anchor's month and day.
    Yearly,
    /// On the given weekdays, 1 = Monday through 7 = Sunday.
    WeeklyOnDays(BTreeSet<u32>),
    /// On the given days of the month (-1 last, -2 second-to-last), limited
    /// to `months` when that set is non-empty.
    MonthlyOnDays {
        days: BTreeSet<i32>,
        months: BTreeSet<u32>,
    },
}

impl RecurrenceRule {
    /// Re-check the invariants the parser enforces.
    ///
    /// The enum is public, so a rule may be built without going through
    /// [`parse`]; the successor engine calls this before doing any date math.
    pub fn check(&self) -> Result<(), ParseError> {
        match self {
            RecurrenceRule::Daily(n) => {
                if !(MIN_INTERVAL_DAYS..=MAX_INTERVAL_DAYS).contains(n) {
                    return Err(ParseError::OutOfRange {
                        field: "interval",
                        value: i64::from(*n),
                    });
                }
            }
            RecurrenceRule::Yearly => {}
            RecurrenceRule::WeeklyOnDays(weekdays) => {
                if weekdays.is_empty() {
                    return Err(ParseError::Malformed("weekday list is empty".into()));
                }
                if let Some(bad) = weekdays.iter().find(|d| !(1..=7).contains(*d)) {
                    return Err(ParseError::OutOfRange {
                        field: "weekday",
                        value: i64::from(*bad),
                    });
                }
            }
            RecurrenceRule::MonthlyOnDays { days, months } => {
                if days.is_empty() {
                    return Err(ParseError::Malformed("day-of-month list is empty".into()));
                }
                if let Some(bad) = days.iter().find(|d| !is_day_selector(**d)) {
                    return Err(ParseError::OutOfRange {
                        field: "day of month",
                        value: i64::from(*bad),
                    });
                }
                if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
                    return Err(ParseError::OutOfRange {
                        field: "month",
                        value: i64::from(*bad),
                    });
                }
                if !can_ever_occur(days, months) {
                    let value = days.iter().copied().max().unwrap_or_default();
                    return Err(ParseError::OutOfRange {
                        field: "day of month",
                        value: i64::from(value),
                    });
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn is_day_selector(day: i32) -> bool {
    (1..=31).contains(&day) || day == LAST_DAY || day == SECOND_TO_LAST_DAY
}

/// Longest month length per month number, counting Feb 29.
fn max_days_in_month(month: u32) -> i32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// A monthly rule must name at least one day that exists in at least one of
/// its months, otherwise no successor exists.
fn can_ever_occur(days: &BTreeSet<i32>, months: &BTreeSet<u32>) -> bool {
    let longest = if months.is_empty() {
        31
    } else {
        months.iter().map(|m| max_days_in_month(*m)).max().unwrap_or(31)
    };
    days.iter().any(|d| *d < 0 || *d <= longest)
}

fn join<T: fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceRule::Daily(n) => write!(f, "d {n}"),
            RecurrenceRule::Yearly => write!(f, "y"),
            RecurrenceRule::WeeklyOnDays(weekdays) => write!(f, "w {}", join(weekdays)),
            RecurrenceRule::MonthlyOnDays { days, months } => {
                write!(f, "m {}", join(days))?;
                if !months.is_empty() {
                    write!(f, " {}", join(months))?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for RecurrenceRule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
