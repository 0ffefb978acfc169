pub mod line_counter;
pub mod record_parser;

pub use line_counter::LineCounter;
pub use record_parser::{CsvRecordParser, ParseOutcome, SkipReason, SkipTally};
