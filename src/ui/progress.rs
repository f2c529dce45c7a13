use indicatif::ProgressBar;
use std::time::Duration;

/// Spinner shown while a long aggregate query runs; hidden when stdout is not a terminal
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = if console::Term::stdout().is_term() {
            let pb = ProgressBar::new_spinner();
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };
        pb.set_message(message.to_string());
        Self { pb }
    }

    /// Remove the spinner line so the table that follows starts clean
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
