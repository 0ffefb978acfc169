pub mod partition_writer;

pub use partition_writer::{PartitionSummary, StationPartitionWriter, WriteOutcome};
