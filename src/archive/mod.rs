pub mod decompressor;
pub mod downloader;
pub mod temp_manager;

pub use decompressor::{Decompressor, LineStream};
pub use downloader::Downloader;
pub use temp_manager::TempFileManager;
