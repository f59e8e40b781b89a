use async_compression::tokio::bufread::GzipDecoder;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::{Client, Url};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWriteExt, BufReader};
use tokio_util::io::StreamReader;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Dataset download or decompression failed")]
    DownloadIo(#[from] io::Error),

    #[error("Failed to create temporary dataset file in '{0}'")]
    TempFile(PathBuf, #[source] io::Error),

    #[error("Failed to move downloaded dataset to '{0}'")]
    Persist(PathBuf, #[source] tempfile::PathPersistError),
}

/// Downloads the dataset at `url` to `destination`, returning the number of bytes written.
///
/// The body is gunzipped on the fly when the URL path ends in `.gz`. Data is written to a
/// temporary file next to `destination` and only moved into place once complete, so an
/// interrupted download never leaves a partial store behind.
pub async fn download_dataset(url: &str, destination: &Path) -> Result<u64, DownloadError> {
    let gzipped = Url::parse(url)
        .map(|u| u.path().ends_with(".gz"))
        .unwrap_or(false);
    info!("Downloading climate dataset from {}", url);
    let start = std::time::Instant::now();

    let response = Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::NetworkRequest(url.to_string(), e))?;
    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            warn!("HTTP error for {}: {:?}", url, e);
            return Err(if let Some(status) = e.status() {
                DownloadError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                DownloadError::NetworkRequest(url.to_string(), e)
            });
        }
    };

    let stream = response
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    let stream_reader = StreamReader::new(stream);
    let mut body: Box<dyn AsyncRead + Unpin + Send> = if gzipped {
        Box::new(GzipDecoder::new(BufReader::new(stream_reader)))
    } else {
        Box::new(stream_reader)
    };

    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let (file, temp_path) = NamedTempFile::new_in(dir)
        .map_err(|e| DownloadError::TempFile(dir.to_path_buf(), e))?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);
    let written = tokio::io::copy(&mut body, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    temp_path
        .persist(destination)
        .map_err(|e| DownloadError::Persist(destination.to_path_buf(), e))?;
    info!(
        "Wrote climate dataset ({} bytes) to {} in {:?}",
        written,
        destination.display(),
        start.elapsed()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_a_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("records.bin");
        // Port 9 on localhost is the discard service and is closed on test machines.
        let err = download_dataset("http://127.0.0.1:9/records.bin", &destination)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::NetworkRequest(..)));
        assert!(!destination.exists());
    }
}
