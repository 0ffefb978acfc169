use crate::utils::constants::PARTITION_EXTENSION;
use std::path::{Path, PathBuf};

/// Strip every character outside `[A-Za-z0-9_-]`.
///
/// # Examples
/// ```
/// use ghcn_station_store::utils::sanitize_station_id;
///
/// assert_eq!(sanitize_station_id("../../etc/passwd"), "etcpasswd");
/// assert_eq!(sanitize_station_id("USW00094728"), "USW00094728");
/// ```
pub fn sanitize_station_id(station_id: &str) -> String {
    station_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// `{root}/{sanitized}.json`, or `None` when nothing survives sanitization.
pub fn partition_path(root: &Path, station_id: &str) -> Option<PathBuf> {
    let sanitized = sanitize_station_id(station_id);
    if sanitized.is_empty() {
        return None;
    }
    Some(root.join(format!("{}.{}", sanitized, PARTITION_EXTENSION)))
}

pub fn is_partition_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == PARTITION_EXTENSION)
}
