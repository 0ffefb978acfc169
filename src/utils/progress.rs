use crate::models::{Phase, ProgressSnapshot};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";
const BYTES_TEMPLATE: &str =
    "{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

/// Terminal view of an ingestion run, fed from tracker snapshots.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    shown_phase: Option<Phase>,
}

impl ProgressReporter {
    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            return Self {
                progress_bar: None,
                shown_phase: None,
            };
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
            shown_phase: None,
        }
    }

    /// Switch the bar style when the phase changes and move it to the
    /// snapshot's counters.
    pub fn render(&mut self, snapshot: &ProgressSnapshot) {
        let Some(ref pb) = self.progress_bar else {
            return;
        };

        if self.shown_phase != Some(snapshot.phase) {
            self.shown_phase = Some(snapshot.phase);
            match snapshot.phase {
                Phase::Downloading if snapshot.total_bytes.is_some() => {
                    pb.set_style(bar_style(BYTES_TEMPLATE));
                }
                Phase::Processing if snapshot.total_lines > 0 => {
                    pb.set_style(bar_style(BAR_TEMPLATE));
                }
                _ => pb.set_style(spinner_style()),
            }
            pb.reset();
        }

        match snapshot.phase {
            Phase::Downloading => {
                if let Some(total) = snapshot.total_bytes {
                    pb.set_length(total);
                }
                pb.set_position(snapshot.downloaded_bytes);
            }
            Phase::Processing => {
                pb.set_length(snapshot.total_lines);
                pb.set_position(snapshot.processed_lines);
            }
            _ => {}
        }
        pb.set_message(snapshot.describe());
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish();
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}
