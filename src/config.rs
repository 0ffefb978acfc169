use crate::error::Result;
use crate::utils::constants::{
    DEFAULT_DATA_DIRECTORY, DEFAULT_DATA_URL, DEFAULT_DOWNLOAD_CHUNK_SIZE,
    DEFAULT_PROGRESS_LOG_INTERVAL, DEFAULT_WRITE_BUFFER_SIZE,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

const CONFIG_FILE: &str = "ghcn-station-store";
const ENV_PREFIX: &str = "GHCN";

/// Runtime settings for ingestion and queries.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// Gzip-compressed CSV source
    #[validate(url)]
    pub data_url: String,

    /// Storage root holding one partition per station
    #[validate(length(min = 1))]
    pub data_directory: String,

    /// Run the line-counting pre-pass so percent-complete is exact
    pub count_lines: bool,

    /// At most 16 MiB
    #[validate(range(min = 1, max = 16777216))]
    pub download_chunk_size: usize,

    #[validate(range(min = 1))]
    pub progress_log_interval: u64,

    /// Per-partition write buffer capacity
    #[validate(range(min = 1))]
    pub write_buffer_size: usize,

    /// Optional deadline for the whole transfer. Unset means none.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    /// Defaults, then an optional config file, then `GHCN__*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("data_url", DEFAULT_DATA_URL)?
            .set_default("data_directory", DEFAULT_DATA_DIRECTORY)?
            .set_default("count_lines", true)?
            .set_default("download_chunk_size", DEFAULT_DOWNLOAD_CHUNK_SIZE as u64)?
            .set_default("progress_log_interval", DEFAULT_PROGRESS_LOG_INTERVAL)?
            .set_default("write_buffer_size", DEFAULT_WRITE_BUFFER_SIZE as u64)?;

        builder = match config_file {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn data_directory(&self) -> PathBuf {
        PathBuf::from(&self.data_directory)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            data_directory: DEFAULT_DATA_DIRECTORY.to_string(),
            count_lines: true,
            download_chunk_size: DEFAULT_DOWNLOAD_CHUNK_SIZE,
            progress_log_interval: DEFAULT_PROGRESS_LOG_INTERVAL,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            request_timeout_secs: None,
        }
    }
}
