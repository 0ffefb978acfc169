pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{is_partition_file, partition_path, sanitize_station_id};
pub use progress::ProgressReporter;
