//! Drives store lookups, spatial interpolation and trend estimation for one query.

use crate::forecast::derived::{long_description, relative_humidity, short_description};
use crate::forecast::error::ForecastError;
use crate::forecast::query::ForecastQuery;
use crate::store::record_store::RecordStore;
use crate::trend;
use crate::types::forecast_result::ForecastResult;
use crate::types::variable::Variable;
use crate::types::year_series::YearSeries;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First historical year consulted for every query.
pub const HISTORY_START_YEAR: i32 = 2015;
/// Last historical year consulted for every query.
pub const HISTORY_END_YEAR: i32 = 2024;

/// Computes [`ForecastResult`]s from a [`RecordStore`].
///
/// Holds no per-query state; clones share the store and can run concurrently.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    store: RecordStore,
}

impl ForecastEngine {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Interpolated historical values of every variable at the query position, one entry
    /// per year that has a record for the query's month, day and hour.
    ///
    /// A year without a record, a record without some variable, or an interpolation that
    /// is undefined (query outside the sample hull, too few samples) only leaves that
    /// `(variable, year)` out.
    ///
    /// # Errors
    ///
    /// Propagates store failures, i.e. the dataset becoming unreadable.
    pub fn year_series(&self, query: &ForecastQuery) -> Result<BTreeMap<Variable, YearSeries>, ForecastError> {
        let pattern = query.pattern();
        let point = query.point();
        let mut series: BTreeMap<Variable, YearSeries> = BTreeMap::new();

        for year in HISTORY_START_YEAR..=HISTORY_END_YEAR {
            let key = pattern.key_for_year(year);
            let Some((record, triangulation)) = self.store.lookup_triangulated(&key)? else {
                debug!("No record for {}", key);
                continue;
            };
            if record.variables.is_empty() {
                continue;
            }

            for variable in Variable::ALL {
                let Some(values) = record.values(variable) else {
                    continue;
                };
                match triangulation.interpolate(values, point) {
                    Some(value) => {
                        series.entry(variable).or_default().push(year, value);
                    }
                    None => debug!(
                        "{} undefined at ({}, {}) for {}",
                        variable, point.0, point.1, key
                    ),
                }
            }
        }

        Ok(series)
    }

    /// Runs the whole forecast for an already parsed query, on the calling thread.
    pub fn forecast_query(&self, query: &ForecastQuery) -> Result<ForecastResult, ForecastError> {
        let series = self.year_series(query)?;
        let target_year = query.target_year();
        let mut result = ForecastResult::default();
        for variable in Variable::ALL {
            let value = series
                .get(&variable)
                .and_then(|s| trend::estimate(s, target_year));
            result.set(variable, value);
        }
        Ok(result)
    }

    /// Parses the query and forecasts it on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// [`ForecastError::InvalidTimeFormat`] for an unparsable date/time, store errors otherwise.
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
        time: &str,
    ) -> Result<ForecastResult, ForecastError> {
        let query = ForecastQuery::parse(latitude, longitude, date, time)?;
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.forecast_query(&query)).await?
    }
}

/// A [`ForecastResult`] together with the text and relative humidity derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(flatten)]
    pub result: ForecastResult,
    pub long_description: String,
    pub short_description: String,
    /// Percent in `[0, 100]`, from the temperature and the dew point.
    pub relative_humidity: Option<f64>,
}

impl From<ForecastResult> for Forecast {
    fn from(result: ForecastResult) -> Self {
        Self {
            long_description: long_description(&result),
            short_description: short_description(&result).to_string(),
            relative_humidity: relative_humidity(result.temperature, result.humidity),
            result,
        }
    }
}
