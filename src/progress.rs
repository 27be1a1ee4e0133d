//! Spinner on stderr while the diff source or metadata API is queried

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// One spinner per network wait; a no-op in quiet and JSON mode
pub struct Progress {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Start spinning with `message`
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(bar);
    }

    /// Stop and erase the spinner, if one is running
    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_never_draws() {
        let mut progress = Progress::new(false);
        progress.spinner("Fetching upgrade diff 0.74.0..0.75.1");
        assert!(progress.bar.is_none());
        progress.finish_and_clear();
    }

    #[test]
    fn test_finish_clears_spinner() {
        let mut progress = Progress::new(true);
        progress.spinner("Querying React Native Directory");
        assert!(progress.bar.is_some());
        progress.finish_and_clear();
        assert!(progress.bar.is_none());
    }
}
