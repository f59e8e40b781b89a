//! Parsing and normalisation of `(latitude, longitude, date, time)` queries.

use crate::forecast::error::ForecastError;
use crate::types::timestamp_key::{MonthDayHour, TimestampKey};
use chrono::{Datelike, NaiveDateTime, Timelike};

const QUERY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A validated forecast query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// The requested time, truncated to the start of its hour.
    pub datetime: NaiveDateTime,
}

impl ForecastQuery {
    /// Parses `date` (`YYYY-MM-DD`) and `time` (`HH:MM`, or a bare `HH`).
    ///
    /// Minutes are accepted but dropped: `"14:37"` addresses the same hour as `"14"`.
    ///
    /// # Errors
    ///
    /// [`ForecastError::InvalidTimeFormat`] carrying the combined input when it does not parse.
    ///
    /// ```
    /// use climatrend::ForecastQuery;
    ///
    /// let a = ForecastQuery::parse(-12.0, -77.0, "2020-06-01", "14").unwrap();
    /// let b = ForecastQuery::parse(-12.0, -77.0, "2020-06-01", "14:00").unwrap();
    /// assert_eq!(a.key(), b.key());
    /// assert_eq!(a.key().as_str(), "2020-06-01 14:00:00");
    /// assert!(ForecastQuery::parse(-12.0, -77.0, "2020-06-01", "2pm").is_err());
    /// ```
    pub fn parse(latitude: f64, longitude: f64, date: &str, time: &str) -> Result<Self, ForecastError> {
        let date = date.trim();
        let time = time.trim();
        let time = if !time.is_empty() && time.len() <= 2 && time.chars().all(|c| c.is_ascii_digit()) {
            format!("{}:00", time)
        } else {
            time.to_string()
        };
        let input = format!("{} {}", date, time);
        let parsed = NaiveDateTime::parse_from_str(&input, QUERY_FORMAT)
            .map_err(|_| ForecastError::InvalidTimeFormat(input.clone()))?;
        let datetime = parsed
            .with_minute(0)
            .ok_or_else(|| ForecastError::InvalidTimeFormat(input))?;
        Ok(Self {
            latitude,
            longitude,
            datetime,
        })
    }

    pub fn key(&self) -> TimestampKey {
        TimestampKey::from_datetime(self.datetime)
    }

    pub fn pattern(&self) -> MonthDayHour {
        MonthDayHour::from_datetime(self.datetime)
    }

    pub fn target_year(&self) -> i32 {
        self.datetime.year()
    }

    /// The query position in store order: `(longitude, latitude)`.
    pub fn point(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_hour_matches_full_time() {
        let a = ForecastQuery::parse(1.0, 2.0, "2021-03-04", "7").unwrap();
        let b = ForecastQuery::parse(1.0, 2.0, "2021-03-04", "07:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key().as_str(), "2021-03-04 07:00:00");
        assert_eq!(a.pattern().to_string(), "03-04 07:00:00");
        assert_eq!(a.target_year(), 2021);
        assert_eq!(a.point(), (2.0, 1.0));
    }

    #[test]
    fn test_minutes_are_truncated() {
        let q = ForecastQuery::parse(0.0, 0.0, "2022-12-31", "23:59").unwrap();
        assert_eq!(q.key().as_str(), "2022-12-31 23:00:00");
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        for (date, time) in [
            ("2022-13-01", "10"),
            ("2022-02-30", "10:00"),
            ("2022-01-01", "24:00"),
            ("2022-01-01", "ten"),
            ("2022-01-01", ""),
            ("01/02/2022", "10:00"),
        ] {
            let err = ForecastQuery::parse(0.0, 0.0, date, time).unwrap_err();
            assert!(matches!(err, ForecastError::InvalidTimeFormat(_)), "{} {}", date, time);
        }
    }

    #[test]
    fn test_error_carries_input() {
        match ForecastQuery::parse(0.0, 0.0, "2022-01-01", "noon") {
            Err(ForecastError::InvalidTimeFormat(input)) => assert_eq!(input, "2022-01-01 noon"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
