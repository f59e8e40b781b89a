mod climatrend;
mod error;
mod forecast;
mod interpolation;
mod store;
mod types;
mod utils;

pub mod trend;

pub use climatrend::*;
pub use error::ClimaTrendError;

pub use forecast::adapters::{hour_labels, Comparison, DailySeries};
pub use forecast::derived::{long_description, relative_humidity, short_description};
pub use forecast::engine::{Forecast, ForecastEngine, HISTORY_END_YEAR, HISTORY_START_YEAR};
pub use forecast::error::ForecastError;
pub use forecast::query::ForecastQuery;

pub use interpolation::{interpolate, Triangulation};

pub use store::codec::{RecordReader, RecordWriter, MAX_FRAME_LEN};
pub use store::download::{download_dataset, DownloadError};
pub use store::error::RecordStoreError;
pub use store::record_store::{LookupMode, RecordStore};

pub use types::forecast_result::{ForecastReply, ForecastResult};
pub use types::record::Record;
pub use types::timestamp_key::{MonthDayHour, TimestampKey};
pub use types::variable::Variable;
pub use types::year_series::YearSeries;
