use crate::error::Result;
use crate::models::{Phase, ProgressSnapshot, WeatherRecord};
use crate::processors::ProgressTracker;
use crate::query::{QueryService, RecordFilter, StationLookup};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

pub const NO_MATCHING_RECORDS: &str = "No matching records found with the specified filters";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub ready: bool,
    pub phase: Phase,
    pub message: String,
    pub counters: ProgressSnapshot,
}

/// Result of a station data request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StationDataResponse {
    /// Ingestion has not reached `Ready`; no data is served.
    Initializing {
        message: String,
        progress: ProgressSnapshot,
    },
    /// Ingestion ended in `Error`; no data will be served by this process.
    Failed {
        message: String,
        progress: ProgressSnapshot,
    },
    NotFound {
        found: bool,
        #[serde(rename = "stationId")]
        station_id: String,
        message: String,
    },
    Found {
        found: bool,
        #[serde(rename = "stationId")]
        station_id: String,
        count: usize,
        records: Vec<WeatherRecord>,
        filters: RecordFilter,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl StationDataResponse {
    pub fn is_found(&self) -> bool {
        matches!(self, StationDataResponse::Found { .. })
    }

    pub fn records(&self) -> &[WeatherRecord] {
        match self {
            StationDataResponse::Found { records, .. } => records,
            _ => &[],
        }
    }
}

/// Status and data operations over one tracker and one storage root.
pub struct WeatherService {
    tracker: Arc<ProgressTracker>,
    query: QueryService,
}

impl WeatherService {
    pub fn new(tracker: Arc<ProgressTracker>, root: &Path) -> Self {
        Self {
            tracker,
            query: QueryService::new(root),
        }
    }

    pub fn get_status(&self) -> StatusResponse {
        let counters = self.tracker.snapshot();
        StatusResponse {
            ready: counters.is_ready(),
            phase: counters.phase,
            message: counters.message.clone(),
            counters,
        }
    }

    /// Serve a station's records, filtered, once ingestion is `Ready`.
    pub fn get_station_data(
        &self,
        station_id: &str,
        element_type: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<StationDataResponse> {
        let progress = self.tracker.snapshot();
        if progress.phase == Phase::Error {
            return Ok(StationDataResponse::Failed {
                message: format!("Data ingestion failed. {}", progress.message),
                progress,
            });
        }
        if !progress.is_ready() {
            return Ok(StationDataResponse::Initializing {
                message: format!("System is initializing. {}", progress.message),
                progress,
            });
        }

        let filters = RecordFilter::new(element_type, start_date, end_date);
        let response = match self.query.query(station_id, &filters)? {
            StationLookup::NotFound => StationDataResponse::NotFound {
                found: false,
                station_id: station_id.to_string(),
                message: format!("No data found for station {}", station_id),
            },
            StationLookup::Found(records) => StationDataResponse::Found {
                found: true,
                station_id: station_id.to_string(),
                count: records.len(),
                message: records.is_empty().then(|| NO_MATCHING_RECORDS.to_string()),
                records,
                filters,
            },
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn ready_tracker() -> Arc<ProgressTracker> {
        let tracker = Arc::new(ProgressTracker::new());
        tracker.advance(Phase::CheckingDirectory);
        tracker.advance(Phase::Ready);
        tracker
    }

    fn store() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ABC.json"),
            "[\n{\"stationId\":\"ABC\",\"date\":\"20240101\",\"element\":\"TMAX\",\"value\":\"150\"},\n\
             {\"stationId\":\"ABC\",\"date\":\"20240102\",\"element\":\"PRCP\",\"value\":\"3\"}\n]",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_data_requests_rejected_until_ready() -> Result<()> {
        let dir = store();
        let tracker = Arc::new(ProgressTracker::new());
        tracker.advance(Phase::Downloading);
        let service = WeatherService::new(Arc::clone(&tracker), dir.path());

        let response = service.get_station_data("ABC", None, None, None)?;
        match response {
            StationDataResponse::Initializing { message, progress } => {
                assert_eq!(progress.phase, Phase::Downloading);
                assert!(message.starts_with("System is initializing"));
            }
            other => panic!("expected initializing response, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_failed_ingestion_is_not_reported_as_initializing() -> Result<()> {
        let dir = store();
        let tracker = Arc::new(ProgressTracker::new());
        tracker.advance(Phase::Downloading);
        tracker.fail("HTTP status 404 Not Found");
        let service = WeatherService::new(tracker, dir.path());

        match service.get_station_data("ABC", None, None, None)? {
            StationDataResponse::Failed { message, progress } => {
                assert_eq!(progress.phase, Phase::Error);
                assert_eq!(message, "Data ingestion failed. Error: HTTP status 404 Not Found");
            }
            other => panic!("expected failed response, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_found_with_filters_echoed() -> Result<()> {
        let dir = store();
        let service = WeatherService::new(ready_tracker(), dir.path());

        let response = service.get_station_data("ABC", Some("tmax"), Some(""), None)?;
        assert!(response.is_found());
        assert_eq!(response.records().len(), 1);

        let json = serde_json::to_value(&response)?;
        assert_eq!(json["status"], "found");
        assert_eq!(json["found"], true);
        assert_eq!(json["count"], 1);
        assert_eq!(json["filters"], serde_json::json!({ "elementType": "tmax" }));
        assert!(json.get("message").is_none());
        Ok(())
    }

    #[test]
    fn test_empty_filtered_result_is_distinct_from_not_found() -> Result<()> {
        let dir = store();
        let service = WeatherService::new(ready_tracker(), dir.path());

        let empty = service.get_station_data("ABC", Some("SNOW"), None, None)?;
        match &empty {
            StationDataResponse::Found { count, message, .. } => {
                assert_eq!(*count, 0);
                assert_eq!(message.as_deref(), Some(NO_MATCHING_RECORDS));
            }
            other => panic!("expected found response, got {:?}", other),
        }

        let missing = service.get_station_data("XYZ", None, None, None)?;
        assert!(matches!(missing, StationDataResponse::NotFound { found: false, .. }));
        Ok(())
    }

    #[test]
    fn test_corrupt_partition_propagates_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("BAD.json"), "[\n{").unwrap();
        let service = WeatherService::new(ready_tracker(), dir.path());

        assert!(matches!(
            service.get_station_data("BAD", None, None, None),
            Err(ProcessingError::QueryIo { .. })
        ));
    }

    #[test]
    fn test_status_reflects_tracker() {
        let dir = TempDir::new().unwrap();
        let tracker = Arc::new(ProgressTracker::new());
        let service = WeatherService::new(Arc::clone(&tracker), dir.path());

        let status = service.get_status();
        assert!(!status.ready);
        assert_eq!(status.phase, Phase::NotStarted);

        tracker.advance(Phase::CheckingDirectory);
        tracker.advance(Phase::Ready);
        let status = service.get_status();
        assert!(status.ready);
        assert_eq!(status.message, "Ready");
        assert_eq!(status.counters.phase, Phase::Ready);
    }
}
