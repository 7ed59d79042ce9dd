//! Terminal output for the demo commands

use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

/// Width of the label column in [`key_value`] and [`escaped`].
const LABEL_WIDTH: usize = 10;

#[derive(Clone, Copy)]
enum Status {
    Success,
    Failure,
    Info,
    Warning,
}

impl Status {
    fn marker(self) -> ColoredString {
        match self {
            Status::Success => "✓".green().bold(),
            Status::Failure => "✗".red().bold(),
            Status::Info => "ℹ".blue().bold(),
            Status::Warning => "⚠".yellow().bold(),
        }
    }
}

/// Failures go to stderr so that `certs` and `sign` output stays pipeable.
fn status_line(status: Status, message: &str) {
    match status {
        Status::Failure => eprintln!("{} {message}", status.marker()),
        _ => println!("{} {message}", status.marker()),
    }
}

pub fn success(message: &str) {
    status_line(Status::Success, message);
}

pub fn error(message: &str) {
    status_line(Status::Failure, message);
}

pub fn info(message: &str) {
    status_line(Status::Info, message);
}

pub fn warning(message: &str) {
    status_line(Status::Warning, message);
}

/// Bold, underlined section title preceded by a blank line.
pub fn header(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Indented `label: value` line with the labels aligned.
pub fn key_value(label: &str, value: &str) {
    println!("  {:<width$} {value}", format!("{label}:").cyan(), width = LABEL_WIDTH + 1);
}

/// Like [`key_value`], but shows newlines and other control characters
/// escaped, so each field of a canonical string is visible.
pub fn escaped(label: &str, bytes: &[u8]) {
    key_value(label, &String::from_utf8_lossy(bytes).escape_debug().to_string());
}

/// Spinner shown while waiting on the gateway. Call `finish_and_clear`
/// before printing results.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(message.to_string());
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}
