pub mod ingestion;
pub mod progress_tracker;

pub use ingestion::{
    prepare_storage, IngestionOrchestrator, IngestionOutcome, IngestionReport, IngestionSource,
    PassStats, StorageState,
};
pub use progress_tracker::ProgressTracker;
