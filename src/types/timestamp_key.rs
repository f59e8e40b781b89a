//! Defines the canonical hour-aligned keys that address records in a climate store,
//! and the month-day-hour pattern used to derive one key per historical year.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identifier of one historical [`crate::Record`].
///
/// Keys have the textual form `YYYY-MM-DD HH:00:00`. Minutes and seconds are always
/// `00`: a key built from a datetime truncates it to the start of its hour.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use climatrend::TimestampKey;
///
/// let dt = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap().and_hms_opt(14, 37, 0).unwrap();
/// assert_eq!(TimestampKey::from_datetime(dt).as_str(), "2020-06-01 14:00:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampKey(String);

impl TimestampKey {
    /// Wraps an already formatted key. No validation is performed: lookups are exact
    /// string matches, so a malformed key simply never matches a record.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds the key of the hour containing `datetime`.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(datetime.format("%Y-%m-%d %H:00:00").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimestampKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimestampKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The year-independent part of a query time: month, day of month and hour.
///
/// Historical keys are produced by substituting a year into this pattern. The substitution
/// is textual, so `02-29` combined with a non-leap year produces a key that no record
/// carries, which the lookup reports as "no data".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDayHour {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl MonthDayHour {
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self {
            month: datetime.month(),
            day: datetime.day(),
            hour: datetime.hour(),
        }
    }

    /// Key of this month/day/hour in `year`.
    pub fn key_for_year(&self, year: i32) -> TimestampKey {
        TimestampKey(format!(
            "{:04}-{:02}-{:02} {:02}:00:00",
            year, self.month, self.day, self.hour
        ))
    }
}

impl fmt::Display for MonthDayHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02} {:02}:00:00", self.month, self.day, self.hour)
    }
}
