use thiserror::Error;

/// Malformed listing input, rejected before any query runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("missing timezone: required by day-of-week and time-of-day filters")]
    MissingTimezone,

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("invalid time of day {value:?}: expected HH:MM:SS")]
    InvalidTimeOfDay { value: String },

    #[error("invalid day of week {0}: expected 0 (Sunday) through 6 (Saturday)")]
    InvalidDayOfWeek(i64),

    #[error("missing current time")]
    MissingCurrentTime,

    #[error("invalid {field}: {value:?}")]
    InvalidEnum { field: &'static str, value: String },
}
