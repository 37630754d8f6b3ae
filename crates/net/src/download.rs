//! File download with progress reporting

use futures::StreamExt;
use pbo_errors::{Error, NetworkError};
use pbo_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use std::convert::TryFrom;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::NetClient;

/// Download operation handle
pub struct Download {
    url: Url,
}

/// Result of a download operation
#[derive(Debug)]
pub struct DownloadResult {
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
}

impl Download {
    /// Create a new download
    ///
    /// # Errors
    ///
    /// Returns an error if the provided URL is invalid or cannot be parsed.
    pub fn new(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
        Ok(Self { url })
    }

    /// Execute the download
    ///
    /// The body is streamed to `<dest>.download` and renamed to `dest` once
    /// complete, so `dest` never holds a partial file. A zero-byte body is
    /// not an error here; callers decide what an empty payload means.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the file cannot be written.
    pub async fn execute(
        self,
        client: &NetClient,
        dest: &Path,
        tx: &EventSender,
    ) -> Result<DownloadResult, Error> {
        let url_str = self.url.to_string();
        let start = Instant::now();

        match self.stream_to(client, &url_str, dest, tx).await {
            Ok(size) => {
                let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                tx.emit_download_completed(url_str.clone(), size, duration_ms);
                Ok(DownloadResult {
                    url: url_str,
                    path: dest.to_path_buf(),
                    size,
                })
            }
            Err(e) => {
                tx.emit(AppEvent::Download(DownloadEvent::Failed {
                    url: url_str,
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn stream_to(
        &self,
        client: &NetClient,
        url_str: &str,
        dest: &Path,
        tx: &EventSender,
    ) -> Result<u64, Error> {
        let response = client.get(self.url.as_str()).await?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                message: response.status().to_string(),
            }
            .into());
        }

        let content_length = response.content_length();
        tx.emit_download_started(url_str, content_length);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }

        let temp_path = dest.with_extension("download");
        let mut file = File::create(&temp_path)
            .await
            .map_err(|e| Error::io_with_path(&e, &temp_path))?;

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&temp_path).await;
                    return Err(NetworkError::DownloadFailed(e.to_string()).into());
                }
            };

            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, &temp_path))?;
            downloaded += chunk.len() as u64;

            tx.emit(AppEvent::Download(DownloadEvent::Progress {
                url: url_str.to_string(),
                downloaded,
                total: content_length,
            }));
        }

        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, &temp_path))?;
        drop(file);

        tokio::fs::rename(&temp_path, dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        Ok(downloaded)
    }
}
