use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;
use tracing::{debug, error};

use super::{ParseError, RecurrenceRule};
use crate::dates::{CalendarDate, days_in_month, is_leap_year, next_month};

/// Upper bound on the monthly scan. Feb 29 is the sparsest day a rule can
/// name and leap years are at most eight years apart.
const MAX_MONTHS_SCANNED: u32 = 12 * 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    #[error("cannot compute next date: {0}")]
    InvalidRule(#[from] ParseError),
    #[error("rule '{rule}' did not advance past {now}")]
    Unreachable { rule: String, now: NaiveDate },
}

/// The inputs of a single successor computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub anchor: CalendarDate,
    pub rule: RecurrenceRule,
    pub now: CalendarDate,
}

impl ScheduleQuery {
    pub fn new(anchor: CalendarDate, rule: RecurrenceRule, now: CalendarDate) -> Self {
        Self { anchor, rule, now }
    }

    pub fn next_occurrence(&self) -> Result<CalendarDate, ComputeError> {
        next_occurrence(self.anchor, &self.rule, self.now)
    }
}

/// Compute the first date that satisfies `rule`, advancing from `anchor`,
/// that is strictly after `now`.
///
/// Daily and yearly rules step from the anchor at least once, and weekly
/// rules scan from the day after the later of `anchor` and `now`. Monthly
/// rules scan from the month holding the later of the two and only compare
/// against `now`, so a future anchor that satisfies the rule comes back
/// unchanged. Pure and deterministic: the caller supplies `now`, nothing is
/// read from the system clock.
pub fn next_occurrence(
    anchor: CalendarDate,
    rule: &RecurrenceRule,
    now: CalendarDate,
) -> Result<CalendarDate, ComputeError> {
    rule.check()?;

    let next = match rule {
        RecurrenceRule::Daily(interval) => next_daily(anchor, *interval, now),
        RecurrenceRule::Yearly => next_yearly(anchor, now),
        RecurrenceRule::WeeklyOnDays(weekdays) => next_weekly(anchor, weekdays, now),
        RecurrenceRule::MonthlyOnDays { days, months } => {
            next_monthly(anchor, days, months, now)
        }
    };

    match next {
        Some(date) => {
            debug!(%rule, %anchor, %now, next = %date, "computed next occurrence");
            Ok(date)
        }
        None => {
            error!(%rule, %anchor, %now, "validated rule failed to advance");
            Err(ComputeError::Unreachable {
                rule: rule.to_string(),
                now,
            })
        }
    }
}

fn next_daily(anchor: NaiveDate, interval: u32, now: NaiveDate) -> Option<NaiveDate> {
    let step = u64::from(interval);
    let mut current = anchor;

    // Jump over whole intervals that still land on or before `now`.
    let gap = (now - anchor).num_days();
    if gap > 0 {
        let skipped = gap as u64 / step;
        current = current.checked_add_days(Days::new(skipped * step))?;
    }

    loop {
        current = current.checked_add_days(Days::new(step))?;
        if current > now {
            return Some(current);
        }
    }
}

fn next_yearly(anchor: NaiveDate, now: NaiveDate) -> Option<NaiveDate> {
    // Years before now's year can never qualify.
    let mut year = anchor.year().max(now.year() - 1);
    loop {
        year = year.checked_add(1)?;
        let candidate = anniversary(anchor, year)?;
        if candidate > now {
            return Some(candidate);
        }
    }
}

/// The anchor's month and day in `year`. Feb 29 moves to Mar 1 in common years.
fn anniversary(anchor: NaiveDate, year: i32) -> Option<NaiveDate> {
    if anchor.month() == 2 && anchor.day() == 29 && !is_leap_year(year) {
        return NaiveDate::from_ymd_opt(year, 3, 1);
    }
    NaiveDate::from_ymd_opt(year, anchor.month(), anchor.day())
}

fn next_weekly(anchor: NaiveDate, weekdays: &BTreeSet<u32>, now: NaiveDate) -> Option<NaiveDate> {
    let mut current = anchor.max(now);
    for _ in 0..7 {
        current = current.checked_add_days(Days::new(1))?;
        if weekdays.contains(&current.weekday().number_from_monday()) {
            return Some(current);
        }
    }
    None
}

fn next_monthly(
    anchor: NaiveDate,
    days: &BTreeSet<i32>,
    months: &BTreeSet<u32>,
    now: NaiveDate,
) -> Option<NaiveDate> {
    let start = anchor.max(now);
    let (mut year, mut month) = (start.year(), start.month());

    for _ in 0..MAX_MONTHS_SCANNED {
        if months.is_empty() || months.contains(&month) {
            let earliest = days
                .iter()
                .filter_map(|selector| resolve_day(year, month, *selector))
                .filter(|date| *date > now)
                .min();
            if earliest.is_some() {
                return earliest;
            }
        }
        (year, month) = next_month(year, month);
    }
    None
}

/// Resolve a day selector against a concrete month. Days the month does not
/// have (the 31st of April) resolve to nothing.
fn resolve_day(year: i32, month: u32, selector: i32) -> Option<NaiveDate> {
    let day = if selector < 0 {
        i64::from(days_in_month(year, month)) + i64::from(selector) + 1
    } else {
        i64::from(selector)
    };
    let day = u32::try_from(day).ok().filter(|day| *day >= 1)?;
    NaiveDate::from_ymd_opt(year, month, day)
}
