//! Parsing of caller-supplied wall-clock inputs: timezones, times of day, days of week.

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::error::FilterError;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parses an IANA timezone name such as `Asia/Ho_Chi_Minh`.
pub fn parse_timezone(name: &str) -> Result<Tz, FilterError> {
    name.trim().parse::<Tz>().map_err(|_| FilterError::UnknownTimezone(name.to_owned()))
}

/// Parses `HH:MM:SS` (or `HH:MM`) into a time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, FilterError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| FilterError::InvalidTimeOfDay { value: value.to_owned() })
}

/// Formats seconds since midnight as `HH:MM:SS`. Negative input clamps to midnight and
/// anything past the end of the day clamps to `23:59:59`.
#[must_use]
pub fn format_seconds_of_day(seconds: i64) -> String {
    let clamped = seconds.clamp(0, SECONDS_PER_DAY - 1);
    let hours = clamped / 3600;
    let minutes = (clamped % 3600) / 60;
    let secs = clamped % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Maps `0 = Sunday .. 6 = Saturday` onto a weekday.
pub fn weekday_from_index(index: i64) -> Result<Weekday, FilterError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(FilterError::InvalidDayOfWeek(other)),
    }
}

/// Inverse of [`weekday_from_index`].
#[must_use]
pub fn weekday_index(day: Weekday) -> i64 {
    i64::from(day.num_days_from_sunday())
}
