//! Defines `ForecastResult`, the per-query estimate of every [`Variable`], and
//! `ForecastReply`, its wire representation including the error form.

use crate::types::variable::Variable;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The projected value of each variable for one `(coordinate, date, hour)` query.
///
/// A `None` field means the value could not be determined: no historical year produced
/// a usable interpolation for that variable. Serialises to
/// `{"temperature": f64|null, "humidity": f64|null, "precipitation": f64|null}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub temperature: Option<f64>,
    /// Dew-point temperature, see [`Variable::Humidity`].
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
}

impl ForecastResult {
    pub fn get(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Temperature => self.temperature,
            Variable::Humidity => self.humidity,
            Variable::Precipitation => self.precipitation,
        }
    }

    pub fn set(&mut self, variable: Variable, value: Option<f64>) {
        let slot = match variable {
            Variable::Temperature => &mut self.temperature,
            Variable::Humidity => &mut self.humidity,
            Variable::Precipitation => &mut self.precipitation,
        };
        *slot = value;
    }

    /// True when no variable could be determined.
    pub fn is_empty(&self) -> bool {
        Variable::ALL.iter().all(|v| self.get(*v).is_none())
    }
}

/// The reply handed to external callers: either the result map or `{"error": "..."}`.
///
/// ```
/// use climatrend::{ForecastReply, ForecastResult};
///
/// let ok = ForecastReply::from(Ok::<_, String>(ForecastResult {
///     temperature: Some(15.0),
///     ..Default::default()
/// }));
/// assert_eq!(
///     serde_json::to_string(&ok).unwrap(),
///     r#"{"temperature":15.0,"humidity":null,"precipitation":null}"#
/// );
///
/// let err = ForecastReply::from(Err::<ForecastResult, _>("bad time"));
/// assert_eq!(serde_json::to_string(&err).unwrap(), r#"{"error":"bad time"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForecastReply {
    Error { error: String },
    Forecast(ForecastResult),
}

impl<E: Display> From<Result<ForecastResult, E>> for ForecastReply {
    fn from(result: Result<ForecastResult, E>) -> Self {
        match result {
            Ok(forecast) => ForecastReply::Forecast(forecast),
            Err(e) => ForecastReply::Error {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_round_trip_per_variable() {
        let mut result = ForecastResult::default();
        assert!(result.is_empty());
        result.set(Variable::Humidity, Some(9.5));
        assert_eq!(result.get(Variable::Humidity), Some(9.5));
        assert_eq!(result.humidity, Some(9.5));
        assert!(!result.is_empty());
    }

    #[test]
    fn test_all_absent_serialises_to_nulls() {
        let json = serde_json::to_value(ForecastResult::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"temperature": null, "humidity": null, "precipitation": null})
        );
    }
}
