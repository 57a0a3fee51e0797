// ============================================================================
// vidprep-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Section headers, status lines and the clip progress bar. Status output goes
// to stdout; errors go to stderr next to the log lines.
//
// KEY COMPONENTS:
// - styling: symbols and section framing
// - print_section, print_status, print_success, print_warning, print_error
// - clip_progress_bar: indicatif bar advanced by the orchestrator callback

// ---- External crate imports ----
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ---- Standard library imports ----
use std::fmt::Display;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const WARNING_SYMBOL: &str = "!";
    pub const ERROR_SYMBOL: &str = "✗";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
    pub const LABEL_WIDTH: usize = 16;

    pub const PROGRESS_TEMPLATE: &str =
        "{spinner:.green} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} clips ({eta})";
}

/// `===== TITLE =====`, preceded by a blank line.
pub fn print_section(title: &str) {
    println!();
    println!(
        "{}",
        style(format!(
            "{}{}{}",
            styling::SECTION_PREFIX,
            title.to_uppercase(),
            styling::SECTION_SUFFIX
        ))
        .cyan()
        .bold()
    );
}

/// An aligned `label: value` line.
pub fn print_status(label: &str, value: impl Display) {
    println!(
        "{}{:<width$} {}",
        styling::STATUS_INDENT,
        format!("{label}:"),
        style(value).bold(),
        width = styling::LABEL_WIDTH
    );
}

pub fn print_success(message: &str) {
    println!(
        "{}{} {}",
        styling::STATUS_INDENT,
        style(styling::SUCCESS_SYMBOL).green().bold(),
        message
    );
}

pub fn print_warning(message: &str) {
    println!(
        "{}{} {}",
        styling::STATUS_INDENT,
        style(styling::WARNING_SYMBOL).yellow().bold(),
        style(message).yellow()
    );
}

/// Written to stderr.
pub fn print_error(message: &str) {
    eprintln!(
        "{} {}",
        style(styling::ERROR_SYMBOL).red().bold(),
        style(message).red()
    );
}

/// Progress bar counting finished clips.
#[must_use]
pub fn clip_progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let bar_style = ProgressStyle::with_template(styling::PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(bar_style);
    bar
}
