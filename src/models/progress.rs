use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Ingestion phases in the order a run passes through them.
///
/// `Ready` and `Error` are terminal. Forward transitions may skip phases
/// (an existing store goes straight from `CheckingDirectory` to `Ready`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Phase {
    NotStarted = 0,
    CheckingDirectory = 1,
    Downloading = 2,
    CountingLines = 3,
    Processing = 4,
    Finalizing = 5,
    Ready = 6,
    Error = 7,
}

impl Phase {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Phase::NotStarted,
            1 => Phase::CheckingDirectory,
            2 => Phase::Downloading,
            3 => Phase::CountingLines,
            4 => Phase::Processing,
            5 => Phase::Finalizing,
            6 => Phase::Ready,
            _ => Phase::Error,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Ready | Phase::Error)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::NotStarted => "Not started",
            Phase::CheckingDirectory => "Checking data directory",
            Phase::Downloading => "Downloading weather data",
            Phase::CountingLines => "Counting total lines",
            Phase::Processing => "Processing data",
            Phase::Finalizing => "Finalizing JSON files",
            Phase::Ready => "Ready",
            Phase::Error => "Error",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Point-in-time copy of the tracker. Counters never go backwards between
/// two snapshots of the same run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
    pub downloaded_bytes: u64,
    pub total_bytes: Option<u64>,
    pub download_percent: Option<u64>,
    pub processed_lines: u64,
    pub total_lines: u64,
    pub process_percent: u64,
    pub valid_lines: u64,
    pub skipped_lines: u64,
    pub stations: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_secs: Option<i64>,
}

impl ProgressSnapshot {
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Human-readable status line for the current phase.
    pub fn describe(&self) -> String {
        match self.phase {
            Phase::Downloading => match (self.download_percent, self.total_bytes) {
                (Some(percent), Some(total)) => format!(
                    "Downloading: {}% ({} MB / {} MB)",
                    percent,
                    self.downloaded_bytes / MIB,
                    total / MIB
                ),
                _ => format!("Downloading: {} MB", self.downloaded_bytes / MIB),
            },
            Phase::Processing => format!(
                "Processing: {}% - {} lines ({} valid), found {} stations",
                self.process_percent, self.processed_lines, self.valid_lines, self.stations
            ),
            Phase::Error => format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("ingestion failed")
            ),
            phase => phase.label().to_string(),
        }
    }
}

/// `floor(downloaded * 100 / total)`, unknown when the total is.
pub fn download_percent(downloaded_bytes: u64, total_bytes: u64) -> Option<u64> {
    if total_bytes == 0 {
        return None;
    }
    Some(((downloaded_bytes as u128 * 100) / total_bytes as u128) as u64)
}

/// `floor(processed * 100 / total)`, zero while the total is unknown.
pub fn process_percent(processed_lines: u64, total_lines: u64) -> u64 {
    if total_lines == 0 {
        return 0;
    }
    ((processed_lines as u128 * 100) / total_lines as u128) as u64
}
