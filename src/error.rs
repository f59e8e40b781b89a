use crate::forecast::error::ForecastError;
use crate::store::download::DownloadError;
use crate::store::error::RecordStoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimaTrendError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    RecordStore(#[from] RecordStoreError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
