use std::collections::BTreeSet;

use super::{MAX_INTERVAL_DAYS, MIN_INTERVAL_DAYS, ParseError, RecurrenceRule, is_day_selector};

/// Decode rule text into a [`RecurrenceRule`].
///
/// Empty text is rejected with `UnknownRule`; callers treat an empty repeat
/// field as "no recurrence" before getting here.
pub fn parse(text: &str) -> Result<RecurrenceRule, ParseError> {
    let mut tokens = text.split_whitespace();
    let Some(kind) = tokens.next() else {
        return Err(ParseError::UnknownRule(text.to_string()));
    };
    let args: Vec<&str> = tokens.collect();

    let rule = match kind {
        "d" => parse_daily(&args)?,
        "y" => {
            if !args.is_empty() {
                return Err(ParseError::Malformed(format!(
                    "yearly rule takes no arguments, got '{}'",
                    args.join(" ")
                )));
            }
            RecurrenceRule::Yearly
        }
        "w" => parse_weekly(&args)?,
        "m" => parse_monthly(&args)?,
        other => return Err(ParseError::UnknownRule(other.to_string())),
    };

    rule.check()?;
    Ok(rule)
}

/// Run the same grammar checks as [`parse`] without keeping the rule.
pub fn validate(text: &str) -> Result<(), ParseError> {
    parse(text).map(|_| ())
}

fn parse_daily(args: &[&str]) -> Result<RecurrenceRule, ParseError> {
    let [raw] = args else {
        return Err(ParseError::Malformed(format!(
            "daily rule expects exactly one interval, got {} arguments",
            args.len()
        )));
    };
    let value = parse_int(raw)?;
    let in_range = i64::from(MIN_INTERVAL_DAYS)..=i64::from(MAX_INTERVAL_DAYS);
    if !in_range.contains(&value) {
        return Err(ParseError::OutOfRange {
            field: "interval",
            value,
        });
    }
    Ok(RecurrenceRule::Daily(value as u32))
}

fn parse_weekly(args: &[&str]) -> Result<RecurrenceRule, ParseError> {
    let [raw] = args else {
        return Err(ParseError::Malformed(format!(
            "weekly rule expects one weekday list, got {} arguments",
            args.len()
        )));
    };
    let weekdays = parse_list(raw, "weekday", |v| (1..=7).contains(&v))?
        .into_iter()
        .map(|v| v as u32)
        .collect();
    Ok(RecurrenceRule::WeeklyOnDays(weekdays))
}

fn parse_monthly(args: &[&str]) -> Result<RecurrenceRule, ParseError> {
    let (raw_days, raw_months) = match args {
        [days] => (*days, None),
        [days, months] => (*days, Some(*months)),
        _ => {
            return Err(ParseError::Malformed(format!(
                "monthly rule expects a day list and an optional month list, got {} arguments",
                args.len()
            )));
        }
    };

    let days = parse_list(raw_days, "day of month", |v| {
        i32::try_from(v).is_ok_and(is_day_selector)
    })?
    .into_iter()
    .map(|v| v as i32)
    .collect();

    let months = match raw_months {
        Some(raw) => parse_list(raw, "month", |v| (1..=12).contains(&v))?
            .into_iter()
            .map(|v| v as u32)
            .collect(),
        None => BTreeSet::new(),
    };

    Ok(RecurrenceRule::MonthlyOnDays { days, months })
}

/// Parse a comma separated list of unique integers, each accepted by `allowed`.
fn parse_list(
    raw: &str,
    field: &'static str,
    allowed: impl Fn(i64) -> bool,
) -> Result<BTreeSet<i64>, ParseError> {
    let mut values = BTreeSet::new();
    for item in raw.split(',') {
        if item.is_empty() {
            return Err(ParseError::Malformed(format!("empty {field} in '{raw}'")));
        }
        let value = parse_int(item)?;
        if !allowed(value) {
            return Err(ParseError::OutOfRange { field, value });
        }
        if !values.insert(value) {
            return Err(ParseError::Malformed(format!(
                "duplicate {field} {value} in '{raw}'"
            )));
        }
    }
    Ok(values)
}

fn parse_int(raw: &str) -> Result<i64, ParseError> {
    raw.parse::<i64>()
        .map_err(|_| ParseError::Malformed(format!("'{raw}' is not an integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parsing_rejects_trailing_comma() {
        let err = parse_list("1,2,", "weekday", |_| true).unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn list_parsing_keeps_values_sorted() {
        let values = parse_list("5,-1,3", "day of month", |_| true).unwrap();
        assert_eq!(values.into_iter().collect::<Vec<_>>(), vec![-1, 3, 5]);
    }

    #[test]
    fn integers_accept_leading_zeros_and_signs() {
        assert_eq!(parse_int("07").unwrap(), 7);
        assert_eq!(parse_int("-2").unwrap(), -2);
        assert!(parse_int("1.5").is_err());
    }
}
