use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::models::ElementCode;
use crate::processors::{IngestionOrchestrator, IngestionOutcome, IngestionSource, ProgressTracker};
use crate::query::QueryService;
use crate::service::WeatherService;
use crate::utils::progress::ProgressReporter;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use validator::Validate;

const PROGRESS_REFRESH: Duration = Duration::from_millis(200);

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Ingest {
            url,
            input,
            data_dir,
            no_line_count,
            quiet,
        } => {
            let mut settings = load_settings(config, data_dir)?;
            if let Some(url) = url {
                settings.data_url = url;
            }
            if no_line_count {
                settings.count_lines = false;
            }
            settings.validate().context("Invalid ingestion settings")?;

            let source = match input {
                Some(path) => IngestionSource::Local(path),
                None => IngestionSource::Remote(settings.data_url.clone()),
            };

            println!("Ingesting weather data...");
            println!("Source: {}", source);
            println!("Data directory: {}", settings.data_directory);

            let tracker = Arc::new(ProgressTracker::new());
            let orchestrator = IngestionOrchestrator::new(settings, Arc::clone(&tracker));
            let mut progress = ProgressReporter::new_spinner("Starting ingestion...", quiet);

            let ingestion = orchestrator.run_from(source);
            tokio::pin!(ingestion);
            let mut ticker = tokio::time::interval(PROGRESS_REFRESH);

            let outcome = loop {
                tokio::select! {
                    result = &mut ingestion => break result,
                    _ = ticker.tick() => progress.render(&tracker.snapshot()),
                }
            };

            match outcome {
                Ok(IngestionOutcome::AlreadyPresent { entries }) => {
                    progress.finish_with_message("Ready");
                    println!(
                        "Data files already exist ({} entries). Skipping download and processing.",
                        entries
                    );
                }
                Ok(IngestionOutcome::Completed(report)) => {
                    progress.finish_with_message(&format!(
                        "Wrote {} station partitions",
                        report.stats.partitions
                    ));
                    println!("\n{}", report.summary());
                    println!("Ingestion complete!");
                }
                Err(e) => {
                    progress.finish_with_message(&tracker.snapshot().describe());
                    return Err(e).context("Ingestion failed");
                }
            }
        }

        Commands::Query {
            station,
            element,
            start_date,
            end_date,
            data_dir,
            pretty,
        } => {
            if let Some(code) = element.as_deref() {
                if !code.is_empty() && ElementCode::from_code(code).is_none() {
                    warn!(element = code, "Not one of the core elements; matching it anyway");
                }
            }

            let service = read_only_service(config, data_dir)?;
            let response = service
                .get_station_data(
                    &station,
                    element.as_deref(),
                    start_date.as_deref(),
                    end_date.as_deref(),
                )
                .with_context(|| format!("Failed to read data for station {}", station))?;

            let json = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{}", json);
        }

        Commands::Status { data_dir } => {
            let service = read_only_service(config, data_dir)?;
            println!("{}", serde_json::to_string_pretty(&service.get_status())?);
        }

        Commands::Info { data_dir } => {
            let settings = load_settings(config, data_dir)?;
            let root = settings.data_directory();

            println!("Data directory: {}", root.display());
            println!("Source URL: {}", settings.data_url);
            if root.is_dir() {
                let partitions = QueryService::new(&root).partition_count()?;
                println!("Station partitions: {}", partitions);
            } else {
                println!("Station partitions: none (directory does not exist)");
            }

            println!("\nElements:");
            for element in ElementCode::ALL {
                println!(
                    "  {:<5} {} ({})",
                    element.code(),
                    element.display_name(),
                    element.units()
                );
            }
        }
    }

    Ok(())
}

fn load_settings(config: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Settings> {
    let mut settings = Settings::load(config).context("Failed to load configuration")?;
    if let Some(dir) = data_dir {
        settings.data_directory = dir.to_string_lossy().into_owned();
    }
    Ok(settings)
}

/// Service over storage written by an earlier `ingest`; never downloads.
fn read_only_service(config: Option<&Path>, data_dir: Option<PathBuf>) -> Result<WeatherService> {
    let settings = load_settings(config, data_dir)?;
    let root = settings.data_directory();
    let tracker = Arc::new(ProgressTracker::new());

    IngestionOrchestrator::new(settings, Arc::clone(&tracker)).adopt_existing_storage()?;
    Ok(WeatherService::new(tracker, &root))
}
