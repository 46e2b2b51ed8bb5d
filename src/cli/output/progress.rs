//! Progress bar utilities using indicatif for terminal output
//!
//! Bars draw to stderr and are hidden entirely in JSON mode so stdout stays
//! machine-readable.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";
const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";

const PROGRESS_CHARS: &str = "█▓▒░ ";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a progress bar for `total` runs
///
/// # Example
/// ```
/// use taskprobe::cli::output::progress::create_progress_bar;
///
/// let pb = create_progress_bar(3, true);
/// pb.inc(1);
/// assert_eq!(pb.position(), 1);
/// pb.finish();
/// ```
pub fn create_progress_bar(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .map(|style| style.progress_chars(PROGRESS_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a spinner for waits of unknown length
pub fn create_spinner_with_message(message: impl Into<String>, hidden: bool) -> ProgressBar {
    let spinner = if hidden {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .map(|style| style.tick_chars(SPINNER_CHARS))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };
    spinner.set_message(message.into());
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.abandon_with_message(format!("✗ {}", message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_bar_tracks_position() {
        let pb = create_progress_bar(5, true);
        assert_eq!(pb.length(), Some(5));
        pb.inc(2);
        assert_eq!(pb.position(), 2);
        pb.finish_success("done");
        assert!(pb.is_finished());
    }

    #[test]
    fn test_hidden_spinner_keeps_message() {
        let spinner = create_spinner_with_message("waiting", true);
        assert_eq!(spinner.message(), "waiting");
        spinner.finish_error("failed");
        assert!(spinner.is_finished());
    }
}
