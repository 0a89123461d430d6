//! Progress display for fetch and install operations

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while network fetches run.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap();
        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// Stop and erase the spinner line so result output starts clean.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Progress bar for batch operations over several skills.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self { bar }
    }

    /// Show which skill is being worked on.
    pub fn start(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
