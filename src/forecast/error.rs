use crate::store::error::RecordStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Invalid date/time '{0}', expected 'YYYY-MM-DD' and 'HH' or 'HH:MM'")]
    InvalidTimeFormat(String),

    #[error("No climate dataset is loaded")]
    DatasetUnavailable,

    #[error(transparent)]
    Store(#[from] RecordStoreError),

    // Covers errors joining tokio blocking tasks
    #[error("Forecast task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ForecastError {
    /// True when the failure is the dataset itself being missing, as opposed to a bad query.
    pub fn is_dataset_unavailable(&self) -> bool {
        matches!(
            self,
            ForecastError::DatasetUnavailable
                | ForecastError::Store(RecordStoreError::DatasetUnavailable(..))
        )
    }
}
