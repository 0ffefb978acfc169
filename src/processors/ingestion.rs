use crate::archive::{Decompressor, Downloader, TempFileManager};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::Phase;
use crate::processors::ProgressTracker;
use crate::readers::{CsvRecordParser, LineCounter, SkipReason, SkipTally};
use crate::writers::{StationPartitionWriter, WriteOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What the storage root looked like before ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageState {
    /// Did not exist and has now been created.
    Created,
    Empty,
    /// Holds this many entries. Treated as a finished store.
    Populated(usize),
}

/// Where the compressed dataset comes from.
#[derive(Debug, Clone)]
pub enum IngestionSource {
    Remote(String),
    Local(PathBuf),
}

impl std::fmt::Display for IngestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionSource::Remote(url) => f.write_str(url),
            IngestionSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IngestionOutcome {
    /// Storage already held files; nothing was downloaded or written.
    AlreadyPresent { entries: usize },
    Completed(IngestionReport),
}

#[derive(Debug, Clone, Default)]
pub struct PassStats {
    pub processed_lines: u64,
    pub valid_lines: u64,
    pub skipped: SkipTally,
    pub partitions: usize,
}

#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub source: String,
    pub downloaded_bytes: u64,
    pub total_lines: Option<u64>,
    pub stats: PassStats,
    pub elapsed: Duration,
}

impl IngestionReport {
    pub fn summary(&self) -> String {
        let total_lines = self
            .total_lines
            .map_or_else(|| "not counted".to_string(), |n| n.to_string());
        format!(
            "Ingestion Summary:\n\
            - Source: {}\n\
            - Downloaded: {:.2} MB\n\
            - Total lines: {}\n\
            - Processed lines: {}\n\
            - Valid lines: {}\n\
            - Skipped lines: {} (empty: {}, too few fields: {}, missing required: {}, parse errors: {})\n\
            - Station partitions: {}\n\
            - Elapsed: {:.1}s",
            self.source,
            self.downloaded_bytes as f64 / 1_048_576.0,
            total_lines,
            self.stats.processed_lines,
            self.stats.valid_lines,
            self.stats.skipped.total(),
            self.stats.skipped.empty_lines,
            self.stats.skipped.too_few_fields,
            self.stats.skipped.missing_required,
            self.stats.skipped.parse_errors,
            self.stats.partitions,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Create the storage root if needed and report whether it already holds data.
///
/// Any entry at all counts as a finished store; contents are not inspected.
pub fn prepare_storage(root: &Path) -> Result<StorageState> {
    let directory_error = |source| ProcessingError::Directory {
        path: root.to_path_buf(),
        source,
    };

    if !root.exists() {
        info!(path = %root.display(), "Creating data directory");
        fs::create_dir_all(root).map_err(directory_error)?;
        return Ok(StorageState::Created);
    }

    let entries = fs::read_dir(root).map_err(directory_error)?.count();
    if entries == 0 {
        Ok(StorageState::Empty)
    } else {
        Ok(StorageState::Populated(entries))
    }
}

/// Sequences download, optional line count, and the partitioning pass once
/// per tracker.
pub struct IngestionOrchestrator {
    settings: Settings,
    tracker: Arc<ProgressTracker>,
}

impl IngestionOrchestrator {
    pub fn new(settings: Settings, tracker: Arc<ProgressTracker>) -> Self {
        Self { settings, tracker }
    }

    pub fn tracker(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.tracker)
    }

    /// Mark the tracker `Ready` if storage is already populated, without
    /// creating anything. Returns whether the tracker is now ready.
    pub fn adopt_existing_storage(&self) -> Result<bool> {
        if self.tracker.phase() != Phase::NotStarted {
            return Ok(self.tracker.is_ready());
        }

        let root = self.settings.data_directory();
        if !root.is_dir() {
            return Ok(false);
        }
        let has_entries = fs::read_dir(&root)
            .map_err(|source| ProcessingError::Directory {
                path: root.clone(),
                source,
            })?
            .next()
            .is_some();

        if has_entries {
            self.tracker.advance(Phase::CheckingDirectory);
            self.tracker.advance(Phase::Ready);
        }
        Ok(self.tracker.is_ready())
    }

    /// Ingest from the configured URL.
    pub async fn run(&self) -> Result<IngestionOutcome> {
        let source = IngestionSource::Remote(self.settings.data_url.clone());
        self.run_from(source).await
    }

    /// Ingest from `source`. Fails with `AlreadyStarted` if this tracker has
    /// already left `NotStarted`.
    pub async fn run_from(&self, source: IngestionSource) -> Result<IngestionOutcome> {
        if !self.tracker.advance(Phase::CheckingDirectory) {
            return Err(ProcessingError::AlreadyStarted);
        }

        match self.execute(source).await {
            Ok(outcome) => {
                self.tracker.advance(Phase::Ready);
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %e, "Error downloading or processing weather data");
                self.tracker.fail(e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(&self, source: IngestionSource) -> Result<IngestionOutcome> {
        let started = Instant::now();
        let root = self.settings.data_directory();

        match prepare_storage(&root)? {
            StorageState::Populated(entries) => {
                info!(
                    path = %root.display(),
                    entries,
                    "Data files already exist. Skipping download and processing."
                );
                return Ok(IngestionOutcome::AlreadyPresent { entries });
            }
            StorageState::Empty => {
                info!(path = %root.display(), "Data directory is empty. Downloading and processing data");
            }
            StorageState::Created => {}
        }

        // Dropping the manager removes the download, on every exit path.
        let (archive_path, downloaded_bytes, temp) = match &source {
            IngestionSource::Remote(url) => {
                let temp = TempFileManager::new()?;
                debug!(path = %temp.temp_dir_path().display(), "Staging directory for download");

                self.tracker.advance(Phase::Downloading);
                let downloader = Downloader::new(
                    self.settings.download_chunk_size,
                    self.settings.request_timeout(),
                )?;
                let path = temp.download_path();
                let bytes = downloader.fetch(url, &path, &self.tracker).await?;
                (path, bytes, Some(temp))
            }
            IngestionSource::Local(path) => (path.clone(), 0, None),
        };

        let decompressor = Decompressor::new(&archive_path);

        let total_lines = if self.settings.count_lines {
            self.tracker.advance(Phase::CountingLines);
            let counting = decompressor.clone();
            let total = tokio::task::spawn_blocking(move || LineCounter::new(&counting).count())
                .await??;
            self.tracker.set_total_lines(total);
            Some(total)
        } else {
            None
        };

        self.tracker.advance(Phase::Processing);
        let pass = IngestionPass {
            root: root.clone(),
            tracker: self.tracker(),
            write_buffer_size: self.settings.write_buffer_size,
            log_interval: self.settings.progress_log_interval.max(1),
        };
        let stats = tokio::task::spawn_blocking(move || pass.run(&decompressor)).await??;

        info!(
            stations = stats.partitions,
            path = %root.display(),
            "Successfully wrote data files"
        );

        if let Some(temp) = temp {
            if let Err(e) = temp.cleanup() {
                warn!(error = %e, "Failed to remove temporary download");
            }
        }

        Ok(IngestionOutcome::Completed(IngestionReport {
            source: source.to_string(),
            downloaded_bytes,
            total_lines,
            stats,
            elapsed: started.elapsed(),
        }))
    }
}

/// The single sequential read-parse-route loop.
struct IngestionPass {
    root: PathBuf,
    tracker: Arc<ProgressTracker>,
    write_buffer_size: usize,
    log_interval: u64,
}

impl IngestionPass {
    fn run(self, decompressor: &Decompressor) -> Result<PassStats> {
        info!(path = %decompressor.path().display(), "Processing data file");
        let mut writer = StationPartitionWriter::new(&self.root, self.write_buffer_size);

        match self.stream(decompressor, &mut writer) {
            Ok(mut stats) => {
                info!(
                    lines = stats.processed_lines,
                    valid = stats.valid_lines,
                    stations = writer.open_partitions(),
                    "Finished reading data file"
                );
                self.tracker.advance(Phase::Finalizing);
                stats.partitions = writer.finish()?.partitions;
                Ok(stats)
            }
            Err(e) => {
                error!(error = %e, "Error processing weather data file");
                writer.abort();
                Err(e)
            }
        }
    }

    fn stream(
        &self,
        decompressor: &Decompressor,
        writer: &mut StationPartitionWriter,
    ) -> Result<PassStats> {
        let parser = CsvRecordParser::new();
        let mut stats = PassStats::default();

        let mut lines = decompressor.lines()?;
        while let Some(line) = lines.next() {
            let line = line?;
            let line_number = lines.line_number();

            match parser.parse_bytes(&line) {
                Ok(record) => {
                    if writer.write(&record)? == WriteOutcome::NewPartition {
                        self.tracker.record_station();
                    }
                    stats.valid_lines += 1;
                    self.tracker.record_valid_line();
                }
                Err(reason) => {
                    if reason != SkipReason::EmptyLine {
                        warn!(
                            line = line_number,
                            reason = %reason,
                            content = %String::from_utf8_lossy(&line),
                            "Skipping line"
                        );
                    }
                    stats.skipped.record(&reason);
                    self.tracker.record_skipped_line();
                }
            }
            stats.processed_lines = line_number;

            if line_number % self.log_interval == 0 {
                info!("{}", self.tracker.snapshot().describe());
            }
        }

        Ok(stats)
    }
}
