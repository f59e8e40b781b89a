//! This module provides the main entry point of the crate: a client that owns the
//! climate dataset and answers point forecasts, derived descriptions, daily series and
//! comparison rows for `(latitude, longitude, date, time)` queries.

use crate::error::ClimaTrendError;
use crate::forecast::adapters::{self, Comparison, DailySeries};
use crate::forecast::engine::{Forecast, ForecastEngine};
use crate::forecast::error::ForecastError;
use crate::store::download::download_dataset;
use crate::store::record_store::{LookupMode, RecordStore};
use crate::types::forecast_result::{ForecastReply, ForecastResult};
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::{info, warn};
use std::path::PathBuf;

/// File name of the dataset inside the cache folder unless configured otherwise.
pub const DEFAULT_DATASET_FILE_NAME: &str = "climate_records.bin";

/// The main client for historical-climate forecasts.
///
/// A client either holds a loaded dataset or, when none could be found or downloaded at
/// construction, answers every forecast with a "dataset unavailable" error. Construction
/// itself only fails when the cache folder cannot be resolved or created.
///
/// Create an instance with [`ClimaTrend::new()`] (default cache folder, no download),
/// [`ClimaTrend::with_cache_folder()`], the full [`ClimaTrend::builder()`], or
/// [`ClimaTrend::from_store()`] when you already own a [`RecordStore`].
///
/// # Examples
///
/// ```rust
/// # use climatrend::{ClimaTrend, ClimaTrendError};
/// # async fn run() -> Result<(), ClimaTrendError> {
/// let client = ClimaTrend::new().await?;
/// let result = client
///     .forecast()
///     .latitude(-12.05)
///     .longitude(-77.04)
///     .date("2026-06-01")
///     .time("12:00")
///     .call()
///     .await?;
/// println!("{:?}", result.temperature);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClimaTrend {
    engine: Option<ForecastEngine>,
}

#[bon]
impl ClimaTrend {
    /// Builds a client, preparing the cache folder and loading the dataset.
    ///
    /// # Optional Builder Methods
    ///
    /// * `.cache_folder(PathBuf)`: where the dataset lives. Defaults to
    ///   `climatrend_cache` inside the system cache directory. Created if missing.
    /// * `.dataset_url(String)`: downloaded once into the cache folder when the dataset
    ///   file is absent. URLs ending in `.gz` are decompressed while downloading.
    /// * `.lookup_mode(LookupMode)`: [`LookupMode::Preloaded`] (default) or
    ///   [`LookupMode::Streaming`].
    /// * `.dataset_file_name(String)`: defaults to [`DEFAULT_DATASET_FILE_NAME`].
    ///
    /// A failed download or an unreadable dataset is logged and leaves the client
    /// without data; see [`ClimaTrend::has_dataset`].
    ///
    /// # Errors
    ///
    /// [`ClimaTrendError::CacheDirResolution`] or [`ClimaTrendError::CacheDirCreation`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use climatrend::{ClimaTrend, ClimaTrendError, LookupMode};
    /// # async fn run() -> Result<(), ClimaTrendError> {
    /// let client = ClimaTrend::builder()
    ///     .cache_folder("/tmp/climatrend".into())
    ///     .dataset_url("https://example.org/climate_records.bin.gz".to_string())
    ///     .lookup_mode(LookupMode::Streaming)
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = builder, finish_fn = build)]
    #[doc(hidden)]
    pub async fn configure(
        cache_folder: Option<PathBuf>,
        dataset_url: Option<String>,
        lookup_mode: Option<LookupMode>,
        dataset_file_name: Option<String>,
    ) -> Result<Self, ClimaTrendError> {
        let cache_folder = match cache_folder {
            Some(folder) => folder,
            None => get_cache_dir().map_err(ClimaTrendError::CacheDirResolution)?,
        };
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| ClimaTrendError::CacheDirCreation(cache_folder.clone(), e))?;

        let dataset_path = cache_folder.join(
            dataset_file_name.unwrap_or_else(|| DEFAULT_DATASET_FILE_NAME.to_string()),
        );
        let present = tokio::fs::try_exists(&dataset_path).await.unwrap_or(false);
        if !present {
            match dataset_url {
                Some(url) => {
                    if let Err(e) = download_dataset(&url, &dataset_path).await {
                        warn!("Failed to download climate dataset from {}: {}", url, e);
                    }
                }
                None => info!(
                    "No climate dataset at {} and no download URL configured",
                    dataset_path.display()
                ),
            }
        }

        let engine = match RecordStore::load(dataset_path, lookup_mode.unwrap_or_default()).await {
            Ok(store) => Some(ForecastEngine::new(store)),
            Err(e) => {
                warn!("Forecasts are unavailable: {}", e);
                None
            }
        };
        Ok(Self { engine })
    }

    /// Creates a client on the default cache folder without a download URL.
    ///
    /// # Errors
    ///
    /// [`ClimaTrendError::CacheDirResolution`] if the system cache directory is unknown,
    /// [`ClimaTrendError::CacheDirCreation`] if it cannot be created.
    pub async fn new() -> Result<Self, ClimaTrendError> {
        Self::builder().build().await
    }

    /// Creates a client whose dataset lives in `cache_folder`.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, ClimaTrendError> {
        Self::builder().cache_folder(cache_folder).build().await
    }

    /// Wraps an already opened store.
    pub fn from_store(store: RecordStore) -> Self {
        Self {
            engine: Some(ForecastEngine::new(store)),
        }
    }

    /// Whether a dataset was loaded. Without one every forecast fails with
    /// [`ForecastError::DatasetUnavailable`].
    pub fn has_dataset(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&ForecastEngine> {
        self.engine.as_ref()
    }

    fn require_engine(&self) -> Result<&ForecastEngine, ForecastError> {
        self.engine.as_ref().ok_or(ForecastError::DatasetUnavailable)
    }

    /// Forecasts temperature, dew point and precipitation at one coordinate and hour.
    ///
    /// # Arguments
    ///
    /// * `.latitude(f64)`, `.longitude(f64)`: **Required.** The query position.
    /// * `.date(&str)`: **Required.** `YYYY-MM-DD`.
    /// * `.time(&str)`: **Required.** `HH:MM` or a bare `HH`; minutes are ignored.
    ///
    /// # Errors
    ///
    /// [`ForecastError::DatasetUnavailable`] without a dataset,
    /// [`ForecastError::InvalidTimeFormat`] for an unparsable date or time.
    #[builder]
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
        time: &str,
    ) -> Result<ForecastResult, ClimaTrendError> {
        let engine = self.require_engine()?;
        Ok(engine.forecast(latitude, longitude, date, time).await?)
    }

    /// Same as [`ClimaTrend::forecast`], with long and short descriptions and the
    /// relative humidity attached.
    #[builder]
    pub async fn describe(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
        time: &str,
    ) -> Result<Forecast, ClimaTrendError> {
        let engine = self.require_engine()?;
        let result = engine.forecast(latitude, longitude, date, time).await?;
        Ok(Forecast::from(result))
    }

    /// The forecast in its wire form: the result map, or `{"error": "..."}`.
    #[builder]
    pub async fn reply(&self, latitude: f64, longitude: f64, date: &str, time: &str) -> ForecastReply {
        ForecastReply::from(
            self.forecast()
                .latitude(latitude)
                .longitude(longitude)
                .date(date)
                .time(time)
                .call()
                .await,
        )
    }

    /// Forecasts every hour of `date`, see [`DailySeries`].
    #[builder]
    pub async fn daily(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
    ) -> Result<DailySeries, ClimaTrendError> {
        let engine = self.require_engine()?;
        Ok(adapters::daily(engine, latitude, longitude, date).await?)
    }

    /// Forecasts one hour and formats it for side-by-side display, see [`Comparison`].
    #[builder]
    pub async fn compare(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
        time: &str,
    ) -> Result<Comparison, ClimaTrendError> {
        let engine = self.require_engine()?;
        Ok(adapters::compare(engine, latitude, longitude, date, time).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::codec::RecordWriter;
    use crate::types::record::Record;
    use crate::types::variable::Variable;
    use std::path::Path;

    const LAT: f64 = 40.4168;
    const LON: f64 = -3.7038;

    fn write_history(path: &Path) {
        let mut writer = RecordWriter::create(path).unwrap();
        for (i, year) in (2015..=2019).enumerate() {
            let record = Record::new(format!("{}-06-01 12:00:00", year).as_str(), vec![(LON, LAT)])
                .with_variable(Variable::Temperature, vec![10.0 + i as f64]);
            writer.append(&record).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end_linear_extrapolation() {
        let dir = tempfile::tempdir().unwrap();
        write_history(&dir.path().join(DEFAULT_DATASET_FILE_NAME));

        for mode in [LookupMode::Preloaded, LookupMode::Streaming] {
            let client = ClimaTrend::builder()
                .cache_folder(dir.path().to_path_buf())
                .lookup_mode(mode)
                .build()
                .await
                .unwrap();
            assert!(client.has_dataset());

            let described = client
                .describe()
                .latitude(LAT)
                .longitude(LON)
                .date("2020-06-01")
                .time("12:00")
                .call()
                .await
                .unwrap();
            assert!((described.result.temperature.unwrap() - 15.0).abs() < 1e-9);
            assert_eq!(described.result.precipitation, None);
            assert_eq!(described.short_description, "Mild");
            assert_eq!(
                described.long_description,
                "The forecast is Cool/Mild (approx. 15.0°C)."
            );
        }
    }

    #[tokio::test]
    async fn test_missing_dataset_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let client = ClimaTrend::with_cache_folder(dir.path().join("cache")).await.unwrap();
        assert!(!client.has_dataset());
        assert!(dir.path().join("cache").is_dir());

        let err = client
            .forecast()
            .latitude(LAT)
            .longitude(LON)
            .date("2020-06-01")
            .time("12")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClimaTrendError::Forecast(ForecastError::DatasetUnavailable)
        ));

        let reply = client
            .reply()
            .latitude(LAT)
            .longitude(LON)
            .date("2020-06-01")
            .time("12")
            .call()
            .await;
        assert!(matches!(reply, ForecastReply::Error { .. }));
    }

    #[tokio::test]
    async fn test_failed_download_leaves_client_usable() {
        let dir = tempfile::tempdir().unwrap();
        let client = ClimaTrend::builder()
            .cache_folder(dir.path().to_path_buf())
            .dataset_url("http://127.0.0.1:9/climate_records.bin.gz".to_string())
            .build()
            .await
            .unwrap();
        assert!(!client.has_dataset());
        assert!(!dir.path().join(DEFAULT_DATASET_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_reply_serialises_invalid_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.bin");
        write_history(&path);
        let client = ClimaTrend::from_store(RecordStore::open(&path, LookupMode::Preloaded).unwrap());

        let reply = client
            .reply()
            .latitude(LAT)
            .longitude(LON)
            .date("2020-06-01")
            .time("noon")
            .call()
            .await;
        let json = serde_json::to_value(&reply).unwrap();
        assert!(json["error"].as_str().unwrap().contains("2020-06-01 noon"));

        let ok = client
            .reply()
            .latitude(LAT)
            .longitude(LON)
            .date("2021-06-01")
            .time("12")
            .call()
            .await;
        let json = serde_json::to_value(&ok).unwrap();
        assert!((json["temperature"].as_f64().unwrap() - 16.0).abs() < 1e-9);
        assert!(json["humidity"].is_null());
    }

    #[tokio::test]
    async fn test_daily_and_compare_through_client() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.bin");
        write_history(&path);
        let client = ClimaTrend::from_store(RecordStore::open(&path, LookupMode::Streaming).unwrap());

        let series = client
            .daily()
            .latitude(LAT)
            .longitude(LON)
            .date("2020-06-01")
            .call()
            .await
            .unwrap();
        assert_eq!(series.labels.len(), 24);
        assert!((series.temperatures[12].unwrap() - 15.0).abs() < 1e-9);
        assert_eq!(series.temperatures[11], None);
        assert_eq!(series.precipitations[12], 0.0);

        let row = client
            .compare()
            .latitude(LAT)
            .longitude(LON)
            .date("2020-06-01")
            .time("12:00")
            .call()
            .await
            .unwrap();
        assert_eq!(row.temperature, "15.0");
        assert_eq!(row.humidity, "N/A");
        assert_eq!(row.forecast, "Mild");
    }
}
