//! Shared CLI output helpers for consistent operator-facing text.

use std::fmt::Display;

use owo_colors::OwoColorize;

use crate::domain::Snapshot;

const RULE_WIDTH: usize = 56;

/// Print a section header and separator.
pub fn section(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}

/// Print a simple key/value line.
pub fn key_value(label: &str, value: impl Display) {
    println!("  {:<18} {}", label.dimmed(), value);
}

/// Print a successful status line.
pub fn ok(message: &str) {
    println!("  {} {}", "✓".green(), message);
}

/// Print an error status line.
pub fn error(message: &str) {
    eprintln!("  {} {}", "×".red(), message);
}

/// Print a single-line note.
pub fn note(message: &str) {
    println!("{message}");
}

/// One-line summary of a published snapshot.
#[must_use]
pub fn summary(snapshot: &Snapshot) -> String {
    let live = match snapshot.current_live() {
        Some(event) => {
            let name = event.name().unwrap_or("unnamed run");
            let lap = event
                .lap_number()
                .map_or_else(|| "-".to_string(), |lap| lap.to_string());
            let flag = event.flag_name().unwrap_or_else(|| "-".to_string());
            format!("{name} lap {lap} flag {flag}")
        }
        None => "none".to_string(),
    };
    let weather = snapshot
        .weather
        .as_ref()
        .and_then(|w| w.temperature())
        .map_or_else(|| "-".to_string(), |t| format!("{t:.1}°"));

    format!(
        "live: {live} | participants: {} | previous: {} | next: {} | weather: {weather} | backend: {}",
        snapshot.participant_list.len(),
        snapshot.previous_event.len(),
        snapshot.next_event.len(),
        snapshot.backend_version(),
    )
}
