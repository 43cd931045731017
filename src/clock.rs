//! Clock-time parsing and shifting for lesson schedules.
//!
//! Configured start times arrive in three shapes, tried in this order:
//!
//! | Input | Example | Format |
//! |-------|---------|--------|
//! | 12-hour text | `"9:30 am"` | `%I:%M %p` |
//! | 24-hour text | `"09:30"` | `%H:%M` |
//! | integer | `570` | minutes since midnight |
//!
//! Schedule rows are stricter: they are always 24-hour `HH:MM`.
//! Shifting wraps around midnight, so a row pushed past `23:59` continues
//! from `00:00`.

use crate::types::StartTime;
use chrono::{NaiveTime, TimeDelta, Timelike};
use thiserror::Error;

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Error, Debug, PartialEq)]
pub enum ClockError {
    #[error(
        "start-time {0} is an invalid format: accept 24 hr (15:00) or 12 hr with am/pm (3:00 pm)"
    )]
    InvalidFormat(String),
    #[error("schedule time {0:?} is not a 24 hr HH:MM time")]
    InvalidRowTime(String),
}

/// Parse a configured start time into a clock time.
pub fn parse_start_time(value: &StartTime) -> Result<NaiveTime, ClockError> {
    match value {
        StartTime::Text(text) => parse_clock_text(text),
        StartTime::Minutes(minutes) => from_minutes(*minutes),
        StartTime::Other(_) => Err(ClockError::InvalidFormat(value.to_string())),
    }
}

/// Parse free-form clock text: 12-hour with am/pm first, then 24-hour.
pub fn parse_clock_text(text: &str) -> Result<NaiveTime, ClockError> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ClockError::InvalidFormat(text.to_string()))
}

/// Parse a schedule row time, strictly `HH:MM`.
pub fn parse_row_time(text: &str) -> Result<NaiveTime, ClockError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|_| ClockError::InvalidRowTime(text.to_string()))
}

/// Interpret an integer as minutes since midnight.
pub fn from_minutes(minutes: i64) -> Result<NaiveTime, ClockError> {
    if !(0..MINUTES_PER_DAY).contains(&minutes) {
        return Err(ClockError::InvalidFormat(minutes.to_string()));
    }
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
        .ok_or_else(|| ClockError::InvalidFormat(minutes.to_string()))
}

/// Minutes since midnight of a clock time.
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Whole minutes from `original` to `configured`, floored. Negative when the
/// workshop starts earlier than the lesson's own schedule.
pub fn delta_minutes(configured: NaiveTime, original: NaiveTime) -> i64 {
    (configured - original).num_seconds().div_euclid(60)
}

/// Shift a clock time by `delta` minutes, wrapping around midnight.
pub fn shift(time: NaiveTime, delta: i64) -> NaiveTime {
    time.overflowing_add_signed(TimeDelta::minutes(delta)).0
}

/// Render as zero-padded `HH:MM`.
pub fn format_hhmm(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}
