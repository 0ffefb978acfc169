use crate::models::progress::{download_percent, process_percent};
use crate::models::{Phase, ProgressSnapshot};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::OnceLock;

/// Shared progress state for one ingestion run.
///
/// The ingestion worker is the only writer. Status callers read through
/// [`ProgressTracker::snapshot`], which never takes a lock. Counters only
/// grow, and the phase only moves forward until it reaches `Ready` or `Error`.
#[derive(Debug)]
pub struct ProgressTracker {
    phase: AtomicU8,
    error: OnceLock<String>,
    started_at: OnceLock<DateTime<Utc>>,
    downloaded_bytes: AtomicU64,
    total_bytes: AtomicU64,
    processed_lines: AtomicU64,
    total_lines: AtomicU64,
    valid_lines: AtomicU64,
    skipped_lines: AtomicU64,
    stations: AtomicU64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(Phase::NotStarted as u8),
            error: OnceLock::new(),
            started_at: OnceLock::new(),
            downloaded_bytes: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            processed_lines: AtomicU64::new(0),
            total_lines: AtomicU64::new(0),
            valid_lines: AtomicU64::new(0),
            skipped_lines: AtomicU64::new(0),
            stations: AtomicU64::new(0),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Ready
    }

    /// Move forward to `next`. Returns `false` when the tracker is already at
    /// or past `next`, or has terminated.
    pub fn advance(&self, next: Phase) -> bool {
        if next == Phase::Error {
            return false;
        }

        let mut current = self.phase.load(Ordering::Acquire);
        loop {
            let phase = Phase::from_u8(current);
            if phase.is_terminal() || next <= phase {
                return false;
            }
            match self.phase.compare_exchange_weak(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if phase == Phase::NotStarted {
                        let _ = self.started_at.set(Utc::now());
                    }
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Enter the terminal `Error` phase from any non-terminal phase.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        if self.phase().is_terminal() {
            return false;
        }
        // Publish the message before the phase so readers seeing Error see it too.
        let _ = self.error.set(message.into());

        let mut current = self.phase.load(Ordering::Acquire);
        loop {
            if Phase::from_u8(current).is_terminal() {
                return false;
            }
            match self.phase.compare_exchange_weak(
                current,
                Phase::Error as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn set_total_bytes(&self, total: u64) {
        self.total_bytes.fetch_max(total, Ordering::Release);
    }

    pub fn add_downloaded_bytes(&self, bytes: u64) -> u64 {
        self.downloaded_bytes.fetch_add(bytes, Ordering::Release) + bytes
    }

    pub fn set_total_lines(&self, total: u64) {
        self.total_lines.fetch_max(total, Ordering::Release);
    }

    pub fn record_valid_line(&self) {
        self.processed_lines.fetch_add(1, Ordering::Release);
        self.valid_lines.fetch_add(1, Ordering::Release);
    }

    pub fn record_skipped_line(&self) {
        self.processed_lines.fetch_add(1, Ordering::Release);
        self.skipped_lines.fetch_add(1, Ordering::Release);
    }

    pub fn record_station(&self) {
        self.stations.fetch_add(1, Ordering::Release);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let phase = self.phase();
        let downloaded_bytes = self.downloaded_bytes.load(Ordering::Acquire);
        let total_bytes = self.total_bytes.load(Ordering::Acquire);
        // Parts before the whole: processed is bumped first, so load it last.
        let valid_lines = self.valid_lines.load(Ordering::Acquire);
        let skipped_lines = self.skipped_lines.load(Ordering::Acquire);
        let processed_lines = self.processed_lines.load(Ordering::Acquire);
        let total_lines = self.total_lines.load(Ordering::Acquire);
        let started_at = self.started_at.get().copied();

        let mut snapshot = ProgressSnapshot {
            phase,
            error: self.error.get().filter(|_| phase == Phase::Error).cloned(),
            message: String::new(),
            downloaded_bytes,
            total_bytes: (total_bytes > 0).then_some(total_bytes),
            download_percent: download_percent(downloaded_bytes, total_bytes),
            processed_lines,
            total_lines,
            process_percent: process_percent(processed_lines, total_lines),
            valid_lines,
            skipped_lines,
            stations: self.stations.load(Ordering::Acquire),
            started_at,
            elapsed_secs: started_at.map(|start| (Utc::now() - start).num_seconds()),
        };
        snapshot.message = snapshot.describe();
        snapshot
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
