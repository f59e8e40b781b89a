use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Climate dataset '{0}' is unavailable")]
    DatasetUnavailable(PathBuf, #[source] std::io::Error),

    #[error("Failed to create record store '{0}'")]
    Create(PathBuf, #[source] std::io::Error),

    #[error("Failed to write record frame")]
    WriteIo(#[source] std::io::Error),

    #[error("Failed to encode record '{0}'")]
    Encode(String, #[source] Box<bincode::error::EncodeError>),

    #[error("Record '{key}' encodes to {len} bytes, above the frame limit")]
    FrameTooLarge { key: String, len: usize },

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
