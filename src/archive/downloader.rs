use crate::error::{ProcessingError, Result};
use crate::processors::ProgressTracker;
use crate::utils::constants::DOWNLOAD_LOG_INTERVAL_BYTES;
use futures_util::TryStreamExt;
use reqwest::{header, Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};

const MIB: u64 = 1024 * 1024;

/// Streams one remote resource to a local file, counting bytes as they land.
///
/// There is no retry: any transport failure fails the fetch.
pub struct Downloader {
    client: Client,
    chunk_size: usize,
}

impl Downloader {
    pub fn new(chunk_size: usize, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Best-effort `HEAD` for the declared size. Any failure means unknown.
    pub async fn probe_size(&self, url: &str) -> Option<u64> {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => declared_length(&response),
            Ok(response) => {
                debug!(status = %response.status(), "HEAD probe rejected, size unknown");
                None
            }
            Err(e) => {
                debug!(error = %e, "HEAD probe failed, size unknown");
                None
            }
        }
    }

    /// Stream `url` into `dest` in `chunk_size` reads, adding each read to the
    /// tracker's downloaded-byte counter. Returns the number of bytes written.
    pub async fn fetch(&self, url: &str, dest: &Path, tracker: &ProgressTracker) -> Result<u64> {
        let total = match self.probe_size(url).await {
            Some(size) => {
                tracker.set_total_bytes(size);
                Some(size)
            }
            None => None,
        };
        info!(url, total_bytes = ?total, "Starting download");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(url, e))?;

        let response = response.error_for_status().map_err(|e| {
            warn!(url, error = %e, "Download rejected by server");
            download_error(url, e)
        })?;

        let total = match total.or_else(|| declared_length(&response)) {
            Some(size) => {
                tracker.set_total_bytes(size);
                Some(size)
            }
            None => None,
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);

        let file = File::create(dest).await?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; self.chunk_size];
        let mut written = 0u64;
        let mut next_log = DOWNLOAD_LOG_INTERVAL_BYTES;

        loop {
            let read = reader.read(&mut buffer).await.map_err(|e| ProcessingError::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            if read == 0 {
                break;
            }

            writer.write_all(&buffer[..read]).await?;
            written += read as u64;
            tracker.add_downloaded_bytes(read as u64);

            if written >= next_log {
                next_log = written + DOWNLOAD_LOG_INTERVAL_BYTES;
                match total {
                    Some(total) => info!(
                        "Downloading: {}% ({} MB / {} MB)",
                        written * 100 / total.max(1),
                        written / MIB,
                        total / MIB
                    ),
                    None => info!("Downloading: {} MB", written / MIB),
                }
            }
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        info!(bytes = written, path = %dest.display(), "Download complete");
        Ok(written)
    }
}

fn declared_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|size| *size > 0)
}

fn download_error(url: &str, error: reqwest::Error) -> ProcessingError {
    let message = match error.status() {
        Some(status) => format!("HTTP status {}", status),
        None => error.to_string(),
    };
    ProcessingError::Download {
        url: url.to_string(),
        message,
    }
}
