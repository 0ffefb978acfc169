use crate::error::{ProcessingError, Result};
use crate::models::WeatherRecord;
use crate::query::filter::{filter_records, RecordFilter};
use crate::utils::{is_partition_file, partition_path};
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum StationLookup {
    NotFound,
    /// Records in partition order.
    Found(Vec<WeatherRecord>),
}

/// Reads station partitions back from the storage root.
///
/// Partitions are immutable once ingestion has finished, so any number of
/// callers may share one service.
#[derive(Debug, Clone)]
pub struct QueryService {
    root: PathBuf,
}

impl QueryService {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Load every record for `station_id`.
    ///
    /// The id is sanitized before it touches the filesystem; an id with no
    /// storable characters is simply not found.
    pub fn load(&self, station_id: &str) -> Result<StationLookup> {
        let Some(path) = partition_path(&self.root, station_id) else {
            debug!(station_id, "Station id sanitizes to nothing");
            return Ok(StationLookup::NotFound);
        };

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(station_id, path = %path.display(), "No partition for station");
                return Ok(StationLookup::NotFound);
            }
            Err(e) => return Err(query_error(station_id, &path, e.to_string())),
        };

        let records: Vec<WeatherRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| query_error(station_id, &path, e.to_string()))?;

        debug!(station_id, records = records.len(), "Loaded partition");
        Ok(StationLookup::Found(records))
    }

    /// `load` followed by `filter`.
    pub fn query(&self, station_id: &str, filter: &RecordFilter) -> Result<StationLookup> {
        Ok(match self.load(station_id)? {
            StationLookup::Found(records) => StationLookup::Found(filter_records(records, filter)),
            StationLookup::NotFound => StationLookup::NotFound,
        })
    }

    pub fn partition_count(&self) -> Result<usize> {
        let entries = fs::read_dir(&self.root).map_err(|source| ProcessingError::Directory {
            path: self.root.clone(),
            source,
        })?;

        let mut count = 0;
        for entry in entries {
            if is_partition_file(&entry?.path()) {
                count += 1;
            }
        }
        Ok(count)
    }
}

fn query_error(station_id: &str, path: &Path, message: String) -> ProcessingError {
    ProcessingError::QueryIo {
        station_id: station_id.to_string(),
        path: path.to_path_buf(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const ABC_PARTITION: &str = "[\n\
{\"stationId\":\"ABC\",\"date\":\"20240103\",\"element\":\"TMAX\",\"value\":\"150\"},\n\
{\"stationId\":\"ABC\",\"date\":\"20240101\",\"element\":\"TMIN\",\"value\":\"-20\",\"qFlag\":\"Q\"}\n]";

    fn store() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ABC.json"), ABC_PARTITION).unwrap();
        dir
    }

    #[test]
    fn test_load_returns_partition_order() -> Result<()> {
        let dir = store();
        let service = QueryService::new(dir.path());

        let StationLookup::Found(records) = service.load("ABC")? else {
            panic!("expected ABC to be found");
        };
        let dates: Vec<&str> = records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["20240103", "20240101"]);
        assert_eq!(records[1].q_flag.as_deref(), Some("Q"));
        Ok(())
    }

    #[test]
    fn test_unknown_station_is_not_found() -> Result<()> {
        let dir = store();
        let service = QueryService::new(dir.path());

        assert_eq!(service.load("XYZ")?, StationLookup::NotFound);
        assert_eq!(service.load("../")?, StationLookup::NotFound);
        Ok(())
    }

    #[test]
    fn test_traversal_attempt_is_confined_to_root() -> Result<()> {
        let dir = TempDir::new()?;
        let root = dir.path().join("store");
        fs::create_dir_all(&root)?;
        fs::write(dir.path().join("secret.json"), "[]")?;

        let service = QueryService::new(&root);
        assert_eq!(service.load("../secret")?, StationLookup::NotFound);
        Ok(())
    }

    #[test]
    fn test_sanitized_id_resolves_same_partition() -> Result<()> {
        let dir = store();
        let service = QueryService::new(dir.path());

        assert!(matches!(service.load("A.B/C")?, StationLookup::Found(r) if r.len() == 2));
        Ok(())
    }

    #[test]
    fn test_corrupt_partition_is_query_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("BAD.json"), "[\n{\"stationId\":").unwrap();
        let service = QueryService::new(dir.path());

        let result = service.load("BAD");
        assert!(matches!(result, Err(ProcessingError::QueryIo { station_id, .. }) if station_id == "BAD"));
    }

    #[test]
    fn test_query_filters_and_distinguishes_empty_from_missing() -> Result<()> {
        let dir = store();
        let service = QueryService::new(dir.path());

        let tmax = RecordFilter::new(Some("tmax"), None, None);
        assert!(matches!(service.query("ABC", &tmax)?, StationLookup::Found(r) if r.len() == 1));

        let none = RecordFilter::new(Some("SNOW"), None, None);
        assert_eq!(service.query("ABC", &none)?, StationLookup::Found(Vec::new()));
        assert_eq!(service.query("XYZ", &none)?, StationLookup::NotFound);
        Ok(())
    }

    #[test]
    fn test_partition_count_ignores_other_files() -> Result<()> {
        let dir = store();
        fs::write(dir.path().join("XYZ.json"), "[\n]")?;
        fs::write(dir.path().join("notes.txt"), "x")?;

        assert_eq!(QueryService::new(dir.path()).partition_count()?, 2);
        Ok(())
    }
}
