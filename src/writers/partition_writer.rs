use crate::error::{ProcessingError, Result};
use crate::models::WeatherRecord;
use crate::utils::constants::{
    PARTITION_CLOSE, PARTITION_EXTENSION, PARTITION_OPEN, PARTITION_SEPARATOR,
};
use crate::utils::sanitize_station_id;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// What a single `write` did to the partition set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// First record for this station; its partition was just created.
    NewPartition,
    Appended,
}

struct OpenPartition {
    writer: BufWriter<File>,
    path: PathBuf,
    records: u64,
}

/// Totals for a finished pass.
#[derive(Debug, Clone, Default)]
pub struct PartitionSummary {
    pub partitions: usize,
    pub records: u64,
}

/// Fans records out to one JSON-array file per station.
///
/// Partitions are keyed by sanitized station id. Every partition stays open
/// until [`finish`](Self::finish) or [`abort`](Self::abort); the registry
/// grows with the number of distinct stations and is never capped.
pub struct StationPartitionWriter {
    root: PathBuf,
    buffer_capacity: usize,
    partitions: HashMap<String, OpenPartition>,
}

impl StationPartitionWriter {
    pub fn new(root: &Path, buffer_capacity: usize) -> Self {
        Self {
            root: root.to_path_buf(),
            buffer_capacity: buffer_capacity.max(1),
            partitions: HashMap::new(),
        }
    }

    pub fn open_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Route `record` to its station's partition, creating it on first use.
    pub fn write(&mut self, record: &WeatherRecord) -> Result<WriteOutcome> {
        let station_id = record.station_id.as_str();
        let key = sanitize_station_id(station_id);
        if key.is_empty() {
            return Err(write_error(station_id, "station id has no storable characters"));
        }
        let json = serde_json::to_vec(record)?;

        let outcome = if self.partitions.contains_key(&key) {
            WriteOutcome::Appended
        } else {
            let partition = self.create_partition(station_id, &key)?;
            self.partitions.insert(key.clone(), partition);
            WriteOutcome::NewPartition
        };

        let partition = self
            .partitions
            .get_mut(&key)
            .ok_or_else(|| write_error(station_id, "partition missing from registry"))?;

        let framed = if partition.records > 0 {
            partition
                .writer
                .write_all(PARTITION_SEPARATOR)
                .and_then(|_| partition.writer.write_all(&json))
        } else {
            partition.writer.write_all(&json)
        };
        framed.map_err(|source| ProcessingError::Write {
            station_id: station_id.to_string(),
            source,
        })?;
        partition.records += 1;

        Ok(outcome)
    }

    fn create_partition(&self, station_id: &str, key: &str) -> Result<OpenPartition> {
        let path = self.root.join(format!("{}.{}", key, PARTITION_EXTENSION));

        let wrap = |source| ProcessingError::Write {
            station_id: station_id.to_string(),
            source,
        };
        let file = File::create(&path).map_err(wrap)?;
        let mut writer = BufWriter::with_capacity(self.buffer_capacity, file);
        writer.write_all(PARTITION_OPEN).map_err(wrap)?;

        debug!(station_id, path = %path.display(), "Opened partition");
        Ok(OpenPartition {
            writer,
            path,
            records: 0,
        })
    }

    /// Close every partition with the array terminator.
    ///
    /// All partitions are attempted; the first failure is returned after the
    /// rest have been released.
    pub fn finish(mut self) -> Result<PartitionSummary> {
        let mut summary = PartitionSummary::default();
        let mut first_error = None;

        for (station_id, mut partition) in self.partitions.drain() {
            let closed = partition
                .writer
                .write_all(PARTITION_CLOSE)
                .and_then(|_| partition.writer.flush());

            match closed {
                Ok(()) => {
                    summary.partitions += 1;
                    summary.records += partition.records;
                }
                Err(source) => {
                    error!(
                        station_id = %station_id,
                        path = %partition.path.display(),
                        error = %source,
                        "Failed to finalize partition"
                    );
                    if first_error.is_none() {
                        first_error = Some(ProcessingError::Write { station_id, source });
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    /// Best-effort release of every open partition without the terminator.
    ///
    /// Data already written stays on disk; those partitions are left
    /// unterminated.
    pub fn abort(&mut self) {
        for (station_id, mut partition) in self.partitions.drain() {
            if let Err(e) = partition.writer.flush() {
                warn!(station_id = %station_id, error = %e, "Error closing partition");
            }
        }
    }
}

fn write_error(station_id: &str, message: &str) -> ProcessingError {
    ProcessingError::Write {
        station_id: station_id.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, message.to_string()),
    }
}
