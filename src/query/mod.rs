pub mod filter;
pub mod station_query;

pub use filter::{filter_records, RecordFilter};
pub use station_query::{QueryService, StationLookup};
