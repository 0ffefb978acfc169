pub mod element;
pub mod progress;
pub mod weather;

pub use element::ElementCode;
pub use progress::{Phase, ProgressSnapshot};
pub use weather::WeatherRecord;
