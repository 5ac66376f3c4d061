use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Progress display shared by all files of one run
#[derive(Clone)]
pub struct ProgressTracker {
    multi: Arc<MultiProgress>,
    enabled: bool,
}

impl ProgressTracker {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Bar counting finished input files
    pub fn files_bar(&self, total: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }

    /// Indeterminate spinner for one stage of one file
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Run `operation` under a spinner, marking it done or failed afterwards
    pub fn with_spinner<F, T, E>(&self, message: &str, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let pb = self.spinner(message);
        let result = operation();
        match &result {
            Ok(_) => pb.finish_with_message(format!("✓ {}", message)),
            Err(_) => pb.abandon_with_message(format!("✗ {}", message)),
        }
        result
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_spinner_returns_result() {
        let progress = ProgressTracker::new(true);
        let result: Result<i32, String> = progress.with_spinner("Test operation", || Ok(42));
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn test_with_spinner_passes_errors_through() {
        let progress = ProgressTracker::new(true);
        let result: Result<(), String> = progress.with_spinner("Failing", || Err("boom".to_string()));
        assert_eq!(result, Err("boom".to_string()));
    }

    #[test]
    fn test_disabled_progress_is_hidden() {
        let progress = ProgressTracker::new(false);
        assert!(!progress.is_enabled());
        assert!(progress.spinner("Test").is_hidden());
        assert!(progress.files_bar(3).is_hidden());
    }

    #[test]
    fn test_files_bar_counts() {
        let progress = ProgressTracker::new(true);
        let pb = progress.files_bar(2);
        pb.inc(2);
        pb.finish();
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 2);
    }
}
