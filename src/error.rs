use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage directory '{path}' is not usable: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decompression error: {0}")]
    Decompression(#[source] std::io::Error),

    #[error("Failed to write partition for station {station_id}: {source}")]
    Write {
        station_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Partition for station {station_id} at '{path}' is unreadable: {message}")]
    QueryIo {
        station_id: String,
        path: PathBuf,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Ingestion has already been started for this process")]
    AlreadyStarted,

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
