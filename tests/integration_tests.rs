mod common;

use common::{fixture_csv, gzip, valid_lines, FixtureServer, DATA_PATH, INVALID_LINES, STATIONS};
use ghcn_station_store::config::Settings;
use ghcn_station_store::models::{Phase, WeatherRecord};
use ghcn_station_store::processors::{IngestionOrchestrator, IngestionOutcome, ProgressTracker};
use ghcn_station_store::service::{StationDataResponse, WeatherService, NO_MATCHING_RECORDS};
use ghcn_station_store::ProcessingError;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn settings(url: String, root: &Path) -> Settings {
    Settings {
        data_url: url,
        data_directory: root.to_string_lossy().into_owned(),
        download_chunk_size: 512,
        progress_log_interval: 50,
        ..Settings::default()
    }
}

#[tokio::test]
async fn test_download_and_partition_pipeline() {
    let body = gzip(&fixture_csv());
    let server = FixtureServer::serve(body.clone()).await;
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("weather_data");

    let tracker = Arc::new(ProgressTracker::new());
    let orchestrator =
        IngestionOrchestrator::new(settings(server.url(DATA_PATH), &root), Arc::clone(&tracker));

    let report = match orchestrator.run().await.unwrap() {
        IngestionOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    };

    assert_eq!(report.downloaded_bytes, body.len() as u64);
    assert_eq!(report.stats.valid_lines, valid_lines());
    assert_eq!(report.stats.skipped.total(), INVALID_LINES);
    assert_eq!(report.stats.partitions, STATIONS.len());

    let mut stored = 0;
    for station in STATIONS {
        let content = fs::read_to_string(root.join(format!("{}.json", station))).unwrap();
        let records: Vec<WeatherRecord> = serde_json::from_str(&content).unwrap();
        assert!(records.iter().all(|r| r.station_id == station));
        assert_eq!(records[0].date, "20240101");
        assert_eq!(records[0].element, "TMAX");
        assert_eq!(records[1].m_flag.as_deref(), Some("T"));
        stored += records.len() as u64;
    }
    assert_eq!(stored, valid_lines());

    // Only partitions land in storage; the download lives elsewhere.
    assert_eq!(fs::read_dir(&root).unwrap().count(), STATIONS.len());

    let snap = tracker.snapshot();
    assert_eq!(snap.phase, Phase::Ready);
    assert_eq!(snap.total_bytes, Some(body.len() as u64));
    assert_eq!(snap.download_percent, Some(100));
    assert_eq!(snap.process_percent, 100);
    assert_eq!(snap.valid_lines, valid_lines());
    assert_eq!(snap.skipped_lines, INVALID_LINES);
    assert_eq!(snap.stations, STATIONS.len() as u64);
}

#[tokio::test]
async fn test_populated_storage_is_never_downloaded() {
    let server = FixtureServer::serve(gzip(&fixture_csv())).await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("weather_data");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("leftover.json"), "[\n").unwrap();

    let tracker = Arc::new(ProgressTracker::new());
    // A URL that would 404 proves no request is made.
    let orchestrator =
        IngestionOrchestrator::new(settings(server.url("/gone"), &root), Arc::clone(&tracker));

    let outcome = orchestrator.run().await.unwrap();

    assert!(matches!(outcome, IngestionOutcome::AlreadyPresent { entries: 1 }));
    assert_eq!(tracker.phase(), Phase::Ready);
    assert_eq!(tracker.snapshot().downloaded_bytes, 0);
    assert_eq!(fs::read_to_string(root.join("leftover.json")).unwrap(), "[\n");
}

#[tokio::test]
async fn test_http_failure_moves_to_error() {
    let server = FixtureServer::serve(gzip(&fixture_csv())).await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("weather_data");

    let tracker = Arc::new(ProgressTracker::new());
    let orchestrator =
        IngestionOrchestrator::new(settings(server.url("/missing.csv.gz"), &root), Arc::clone(&tracker));

    let result = orchestrator.run().await;

    assert!(matches!(result, Err(ProcessingError::Download { .. })));
    let snap = tracker.snapshot();
    assert_eq!(snap.phase, Phase::Error);
    assert!(snap.error.as_deref().unwrap_or_default().contains("404"));

    // The storage root was created but holds nothing.
    assert!(root.is_dir());
    assert_eq!(fs::read_dir(&root).unwrap().count(), 0);

    // Error is terminal.
    assert!(!tracker.advance(Phase::Ready));
    assert!(matches!(orchestrator.run().await, Err(ProcessingError::AlreadyStarted)));
}

#[tokio::test]
async fn test_queries_after_ingestion() {
    let server = FixtureServer::serve(gzip(&fixture_csv())).await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("weather_data");

    let tracker = Arc::new(ProgressTracker::new());
    let service = WeatherService::new(Arc::clone(&tracker), &root);

    let early = service.get_station_data(STATIONS[0], None, None, None).unwrap();
    assert!(matches!(early, StationDataResponse::Initializing { .. }));

    IngestionOrchestrator::new(settings(server.url(DATA_PATH), &root), Arc::clone(&tracker))
        .run()
        .await
        .unwrap();

    let all = service.get_station_data(STATIONS[0], None, None, None).unwrap();
    assert_eq!(all.records().len(), 60);

    let window = service
        .get_station_data(STATIONS[0], Some("tmax"), Some("20240110"), Some("20240119"))
        .unwrap();
    let dates: Vec<&str> = window.records().iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates.len(), 10);
    assert_eq!(dates.first(), Some(&"20240110"));
    assert_eq!(dates.last(), Some(&"20240119"));

    // Traversal characters are stripped before resolving the partition.
    let sneaky = service
        .get_station_data(&format!("../{}", STATIONS[1]), None, None, None)
        .unwrap();
    assert!(sneaky.is_found());

    let none = service
        .get_station_data(STATIONS[2], Some("SNOW"), None, None)
        .unwrap();
    match none {
        StationDataResponse::Found { count, message, .. } => {
            assert_eq!(count, 0);
            assert_eq!(message.as_deref(), Some(NO_MATCHING_RECORDS));
        }
        other => panic!("expected an empty found response, got {:?}", other),
    }

    let missing = service.get_station_data("ZZZ00000000", None, None, None).unwrap();
    assert!(matches!(missing, StationDataResponse::NotFound { .. }));
}

#[tokio::test]
async fn test_status_never_goes_backwards_during_run() {
    let server = FixtureServer::serve(gzip(&fixture_csv())).await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("weather_data");

    let tracker = Arc::new(ProgressTracker::new());
    let service = WeatherService::new(Arc::clone(&tracker), &root);
    let orchestrator =
        IngestionOrchestrator::new(settings(server.url(DATA_PATH), &root), Arc::clone(&tracker));

    let run = orchestrator.run();
    tokio::pin!(run);
    let mut ticker = tokio::time::interval(Duration::from_millis(1));
    let mut observed = vec![service.get_status()];

    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            _ = ticker.tick() => observed.push(service.get_status()),
        }
    };
    result.unwrap();
    observed.push(service.get_status());

    for pair in observed.windows(2) {
        let (before, after) = (&pair[0].counters, &pair[1].counters);
        assert!(after.phase >= before.phase);
        assert!(after.downloaded_bytes >= before.downloaded_bytes);
        assert!(after.processed_lines >= before.processed_lines);
        assert!(after.valid_lines >= before.valid_lines);
        assert!(after.skipped_lines >= before.skipped_lines);
        assert!(after.stations >= before.stations);
    }

    let last = observed.last().unwrap();
    assert!(last.ready);
    assert_eq!(last.counters.processed_lines, valid_lines() + INVALID_LINES);
}
