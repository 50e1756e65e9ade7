//! Progress display module
//!
//! Status lines, a spinner fed by search events and the end-of-run summary.

use crate::session::{SearchEvent, SearchRun, SourceStatus};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Print a section header
pub fn print_header(text: &str) {
    println!("\n{} {}", "▶".green(), text.green().bold());
}

/// Print an info message
pub fn print_info(text: &str) {
    println!("  {} {}", "ℹ".cyan(), text);
}

/// Print a success message
pub fn print_success(text: &str) {
    println!("  {} {}", "✔".green(), text.green());
}

/// Print a warning message
pub fn print_warning(text: &str) {
    println!("  {} {}", "⚠".yellow(), text.yellow());
}

/// Print an error message
pub fn print_error(text: &str) {
    eprintln!("  {} {}", "✖".red(), text.red());
}

/// Print a bullet point
pub fn print_bullet(text: &str) {
    println!("  {} {}", "•".green(), text);
}

/// Create a styled spinner for indeterminate progress
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );

    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Apply one search event to the spinner
pub fn render_event(pb: &ProgressBar, event: &SearchEvent) {
    match event {
        SearchEvent::Status(message) => pb.set_message(message.clone()),
        SearchEvent::Source(update) => match &update.status {
            SourceStatus::Success { count } => pb.println(format!(
                "  {} {} ({} words)",
                "✔".green(),
                update.source_key,
                format_number(*count as u64)
            )),
            SourceStatus::Error { message } => pb.println(format!(
                "  {} {}: {}",
                "⚠".yellow(),
                update.source_key,
                message.yellow()
            )),
            SourceStatus::Pending | SourceStatus::Loading => {}
        },
        SearchEvent::Progress { .. } => pb.tick(),
    }
}

/// Print final statistics
pub fn print_summary(run: &SearchRun) {
    println!();
    println!("{}", "═".repeat(60).green());
    println!("{}", "                    SEARCH COMPLETE".green().bold());
    println!("{}", "═".repeat(60).green());
    println!();

    for (key, status) in &run.source_status {
        match status {
            SourceStatus::Success { count } => {
                println!("  {} {:<12} {}", "✔".green(), key, format_number(*count as u64))
            }
            SourceStatus::Error { message } => {
                println!("  {} {:<12} {}", "✖".red(), key, message.red())
            }
            SourceStatus::Pending | SourceStatus::Loading => {
                println!("  {} {:<12} {}", "•".dimmed(), key, "not loaded".dimmed())
            }
        }
    }
    if !run.source_status.is_empty() {
        println!();
    }

    println!("  {} {}", "Words loaded:   ".green(), format_number(run.total_words as u64));
    if run.dedup.duplicate_count > 0 {
        println!(
            "  {} {}",
            "Duplicates:     ".green(),
            format_number(run.dedup.duplicate_count as u64)
        );
    }
    println!(
        "  {} {}",
        "Matches:        ".green().bold(),
        format_number(run.match_count as u64).green().bold()
    );
    println!("  {} {}", "Search time:    ".green(), format_duration(run.elapsed));
    println!();
    println!("{}", "═".repeat(60).green());
}

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs == 0 {
        format!("{:.1}ms", duration.as_secs_f64() * 1000.0)
    } else if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}
