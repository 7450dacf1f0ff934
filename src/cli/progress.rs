//! CLI-specific progress handling for butterfly-directions
//!
//! Remote directions can take a few seconds; a spinner on stderr shows the
//! request is alive without polluting stdout.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a spinner for CLI display
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Spinner shown while directions are computed
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create and start a spinner, unless `quiet`
    pub fn new(message: &str, quiet: bool) -> Self {
        let pb = if quiet {
            ProgressBar::hidden()
        } else {
            create_spinner(message)
        };
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Stop the spinner and clear it from the terminal
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
