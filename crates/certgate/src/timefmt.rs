// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-friendly durations and timestamps for the CLI.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Display and input format for local timestamps.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Token lifetime when no expiry is given.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * DAY);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("empty duration string")]
    Empty,
    #[error("invalid duration format: {0}")]
    Invalid(String),
    #[error("invalid number in duration: {0}")]
    InvalidNumber(String),
    #[error("missing unit after number {0}")]
    MissingUnit(String),
    #[error("unknown duration unit: {0}")]
    UnknownUnit(String),
    #[error(
        "invalid expiry {0:?}; use a duration (2y, 3months, 5d, 2h30m) \
         or a date (YYYY-MM-DD HH:MM:SS, YYYY-MM-DD, RFC 3339)"
    )]
    InvalidExpiry(String),
}

fn unit_seconds(unit: &str) -> Option<u64> {
    // `m` is minutes and `M` is months; everything else is case-insensitive.
    if unit == "M" {
        return Some(30 * DAY);
    }
    let secs = match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
        "d" | "day" | "days" => DAY,
        "w" | "week" | "weeks" => 7 * DAY,
        "mo" | "month" | "months" => 30 * DAY,
        "y" | "year" | "years" => 365 * DAY,
        _ => return None,
    };
    Some(secs)
}

/// Parse a compound duration such as `2h30m`, `1y6M`, or `1.5d`.
///
/// Months are 30 days and years 365 days.
pub fn parse_duration(input: &str) -> Result<Duration, TimeParseError> {
    if input.is_empty() {
        return Err(TimeParseError::Empty);
    }

    let is_num = |c: char| c.is_ascii_digit() || c == '.';
    let mut total = Duration::ZERO;
    let mut rest = input;

    while !rest.is_empty() {
        let num_len = rest.find(|c: char| !is_num(c)).unwrap_or(rest.len());
        if num_len == 0 {
            return Err(TimeParseError::Invalid(input.to_owned()));
        }
        let (num_str, tail) = rest.split_at(num_len);
        let num: f64 =
            num_str.parse().map_err(|_| TimeParseError::InvalidNumber(num_str.to_owned()))?;

        let unit_len = tail.find(is_num).unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(TimeParseError::MissingUnit(num_str.to_owned()));
        }
        let secs = unit_seconds(unit).ok_or_else(|| TimeParseError::UnknownUnit(unit.to_owned()))?;

        let part = Duration::try_from_secs_f64(num * secs as f64)
            .map_err(|_| TimeParseError::Invalid(input.to_owned()))?;
        total = total.checked_add(part).ok_or_else(|| TimeParseError::Invalid(input.to_owned()))?;
        rest = tail;
    }

    Ok(total)
}

/// Resolve an expiry given as a duration from `now` or an absolute time.
///
/// Absolute forms without an offset are read in local time. A bare date
/// means the end of that day.
pub fn parse_expiry(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TimeParseError> {
    let invalid = || TimeParseError::InvalidExpiry(input.to_owned());
    let input = input.trim();

    if let Ok(d) = parse_duration(input) {
        let delta = chrono::Duration::from_std(d).map_err(|_| invalid())?;
        return now.checked_add_signed(delta).ok_or_else(invalid);
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }

    for format in [DATE_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return local_to_utc(naive).ok_or_else(invalid);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let end_of_day = date.and_hms_opt(23, 59, 59).ok_or_else(invalid)?;
        return local_to_utc(end_of_day).ok_or_else(invalid);
    }

    Err(invalid())
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local.from_local_datetime(&naive).earliest().map(|at| at.with_timezone(&Utc))
}

/// Render `at` in local time using [`DATE_TIME_FORMAT`].
pub fn format_date_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DATE_TIME_FORMAT).to_string()
}

/// Coarse remaining-time string: `45s`, `30m`, `5h`, `3 days 5 hours`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < MINUTE {
        return format!("{secs}s");
    }
    if secs < HOUR {
        return format!("{}m", (secs + MINUTE / 2) / MINUTE);
    }
    if secs < DAY {
        return format!("{}h", (secs + HOUR / 2) / HOUR);
    }

    let days = secs / DAY;
    let hours = (secs % DAY) / HOUR;
    let day_word = if days == 1 { "day" } else { "days" };
    match hours {
        0 => format!("{days} {day_word}"),
        1 => format!("{days} {day_word} 1 hour"),
        h => format!("{days} {day_word} {h} hours"),
    }
}

#[cfg(test)]
#[path = "timefmt_tests.rs"]
mod tests;
