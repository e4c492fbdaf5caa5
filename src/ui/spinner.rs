//! Progress spinner utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner with the given message
///
/// Returns `None` if quiet mode is enabled.
pub fn create_spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

/// Update the spinner message, if there is a spinner
pub fn set_spinner_message(spinner: &Option<ProgressBar>, message: String) {
    if let Some(s) = spinner {
        s.set_message(message);
    }
}

/// Finish spinner with a message
pub fn finish_spinner(spinner: Option<ProgressBar>, message: &str) {
    if let Some(s) = spinner {
        s.finish_with_message(message.to_string());
    }
}

/// Finish spinner according to whether the walk came back whole
pub fn finish_spinner_with_status(spinner: Option<ProgressBar>, count: usize, partial: bool) {
    if let Some(s) = spinner {
        if partial && count == 0 {
            s.finish_and_clear();
        } else if partial {
            s.finish_with_message(format!("Fetched {} departments, with errors", count));
        } else {
            s.finish_with_message(format!("Fetched {} departments", count));
        }
    }
}
