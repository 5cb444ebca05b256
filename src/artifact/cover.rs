//! Streaming cover image download for matched items.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::user_agent;

/// Fixed cover filename inside the item directory.
pub const COVER_FILENAME: &str = "cover.jpg";

/// Connect timeout for cover requests.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout for cover requests; thumbnails are small.
const READ_TIMEOUT_SECS: u64 = 60;

/// Errors that can occur while fetching a cover image.
#[derive(Debug, Error)]
pub enum CoverError {
    /// Network-level error (DNS resolution, connection refused, mid-stream drop).
    #[error("network error fetching cover {url}: {source}")]
    Network {
        /// The thumbnail URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response from the image host.
    #[error("HTTP {status} fetching cover {url}")]
    HttpStatus {
        /// The thumbnail URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error writing the image.
    #[error("IO error writing cover to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl CoverError {
    fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    fn io(path: PathBuf, source: std::io::Error) -> Self {
        Self::Io { path, source }
    }
}

/// Downloads cover thumbnails with streaming writes.
///
/// Created once per run and reused across items for connection pooling.
#[derive(Debug, Clone)]
pub struct CoverDownloader {
    client: Client,
}

impl Default for CoverDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverDownloader {
    /// Creates a new downloader with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(user_agent::default_http_user_agent())
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Streams the image at `url` into `<item_dir>/cover.jpg`.
    ///
    /// Any existing cover is truncated first, so re-runs converge on the
    /// current catalog image. A failure mid-stream removes the partial file
    /// rather than leaving a corrupt artifact behind.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError`] on transport, status, or I/O failure.
    pub async fn download(&self, url: &str, item_dir: &Path) -> Result<PathBuf, CoverError> {
        let cover_path = item_dir.join(COVER_FILENAME);
        debug!(url = %url, path = %cover_path.display(), "Fetching cover image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoverError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoverError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let file = File::create(&cover_path)
            .await
            .map_err(|e| CoverError::io(cover_path.clone(), e))?;
        if let Err(error) = stream_to_file(file, response, url, &cover_path).await {
            // Best-effort cleanup so a truncated image does not pass for a cover.
            let _ = tokio::fs::remove_file(&cover_path).await;
            return Err(error);
        }

        debug!(path = %cover_path.display(), "Cover written");
        Ok(cover_path)
    }
}

async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    cover_path: &Path,
) -> Result<(), CoverError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| CoverError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| CoverError::io(cover_path.to_path_buf(), e))?;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| CoverError::io(cover_path.to_path_buf(), e))?;

    Ok(())
}
