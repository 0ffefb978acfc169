/// Default source: the GHCN-Daily observations for one year
pub const DEFAULT_DATA_URL: &str = "https://www.ncei.noaa.gov/pub/data/ghcn/daily/by_year/2024.csv.gz";

/// Default storage root for station partitions
pub const DEFAULT_DATA_DIRECTORY: &str = "weather_data";

/// Partition files
pub const PARTITION_EXTENSION: &str = "json";
pub const PARTITION_OPEN: &[u8] = b"[\n";
pub const PARTITION_SEPARATOR: &[u8] = b",\n";
pub const PARTITION_CLOSE: &[u8] = b"\n]";

/// Temporary download file
pub const DOWNLOAD_FILE_NAME: &str = "weather_data.csv.gz";

/// Line layout: stationId,date,element,value[,mFlag,qFlag,sFlag,obsTime]
pub const REQUIRED_FIELDS: usize = 4;

/// Processing defaults
pub const DEFAULT_DOWNLOAD_CHUNK_SIZE: usize = 8192;
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 8192;
pub const DEFAULT_PROGRESS_LOG_INTERVAL: u64 = 100_000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DOWNLOAD_LOG_INTERVAL_BYTES: u64 = 1024 * 1024;
