use crate::error::{ProcessingError, Result};
use crate::utils::constants::DOWNLOAD_FILE_NAME;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scoped home for the downloaded archive. Everything under it is removed
/// when the manager is dropped, whether the run succeeded or not.
pub struct TempFileManager {
    temp_dir: TempDir,
}

impl TempFileManager {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("ghcn-download-")
            .tempdir()
            .map_err(|e| ProcessingError::Directory {
                path: std::env::temp_dir(),
                source: e,
            })?;

        Ok(Self { temp_dir })
    }

    pub fn temp_dir_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Destination for the compressed download.
    pub fn download_path(&self) -> PathBuf {
        self.temp_dir.path().join(DOWNLOAD_FILE_NAME)
    }

    /// Remove the directory now and surface any failure.
    pub fn cleanup(self) -> Result<()> {
        self.temp_dir.close()?;
        Ok(())
    }
}
