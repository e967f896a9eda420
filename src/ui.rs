//! Console output helpers
//!
//! Styled status lines for stage progress plus a spinner for long-running
//! external processes.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Print a green check line for a completed step
pub fn success(message: &str) {
    println!("{} {}", Style::new().green().bold().apply_to("✓"), message);
}

/// Print a yellow warning line
pub fn warn(message: &str) {
    println!(
        "{} {}",
        Style::new().yellow().bold().apply_to("warning:"),
        message
    );
}

/// Print a bold section heading
pub fn heading(message: &str) {
    println!("{}", Style::new().bold().apply_to(message));
}

/// Spinner shown while an external process runs
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
