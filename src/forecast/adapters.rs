//! Shapes built on top of single forecasts: a 24-hour series for charts and a
//! preformatted comparison row.

use crate::forecast::derived::{relative_humidity, short_description};
use crate::forecast::engine::ForecastEngine;
use crate::forecast::error::ForecastError;
use crate::types::forecast_result::ForecastResult;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

/// Hour-ordered forecasts for one date and coordinate.
///
/// Index `h` of every array belongs to `labels[h]` (`"00:00"` to `"23:00"`). Missing
/// precipitation is reported as `0.0`; missing temperature or humidity stays `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub labels: Vec<String>,
    pub temperatures: Vec<Option<f64>>,
    /// Dew points, as stored in the dataset.
    pub humidities: Vec<Option<f64>>,
    pub precipitations: Vec<f64>,
}

impl DailySeries {
    fn push(&mut self, label: String, result: &ForecastResult) {
        self.labels.push(label);
        self.temperatures.push(result.temperature);
        self.humidities.push(result.humidity);
        self.precipitations.push(result.precipitation.unwrap_or(0.0));
    }
}

/// Labels of the 24 hours of a day, `"00:00"` to `"23:00"`.
pub fn hour_labels() -> Vec<String> {
    (0..24).map(|hour| format!("{:02}:00", hour)).collect()
}

/// Forecasts all 24 hours of `date` concurrently and reassembles them in hour order.
///
/// # Errors
///
/// The first error of any hour, in hour order (for example an invalid `date`).
pub async fn daily(
    engine: &ForecastEngine,
    latitude: f64,
    longitude: f64,
    date: &str,
) -> Result<DailySeries, ForecastError> {
    let labels = hour_labels();
    let results = join_all(
        labels
            .iter()
            .map(|label| engine.forecast(latitude, longitude, date, label)),
    )
    .await;

    let mut series = DailySeries::default();
    for (label, result) in labels.into_iter().zip(results) {
        series.push(label, &result?);
    }
    Ok(series)
}

/// One forecast rendered as display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub date: String,
    pub time: String,
    /// Short description, see [`crate::short_description`].
    pub forecast: String,
    /// `"{:.1}"` or `"N/A"`.
    pub temperature: String,
    /// `"{:.1}"` when positive, `"0"` otherwise.
    pub precipitation: String,
    /// Relative humidity in percent, `"{:.0}"` or `"N/A"`.
    pub humidity: String,
}

impl Comparison {
    pub fn new(date: &str, time: &str, result: &ForecastResult) -> Self {
        let temperature = match result.temperature {
            Some(t) => format!("{:.1}", t),
            None => "N/A".to_string(),
        };
        let precipitation = match result.precipitation {
            Some(p) if p > 0.0 => format!("{:.1}", p),
            _ => "0".to_string(),
        };
        let humidity = match relative_humidity(result.temperature, result.humidity) {
            Some(rh) => format!("{:.0}", rh),
            None => "N/A".to_string(),
        };
        Self {
            date: date.to_string(),
            time: time.to_string(),
            forecast: short_description(result).to_string(),
            temperature,
            precipitation,
            humidity,
        }
    }
}

/// Forecasts a single `(date, time)` and formats it as a [`Comparison`].
pub async fn compare(
    engine: &ForecastEngine,
    latitude: f64,
    longitude: f64,
    date: &str,
    time: &str,
) -> Result<Comparison, ForecastError> {
    let result = engine.forecast(latitude, longitude, date, time).await?;
    Ok(Comparison::new(date, time, &result))
}
