//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use nudge_core::Record;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning to stderr.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{json}");
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Print one reminder per line: id, due time, label.
pub fn record_line(record: &Record) {
    println!(
        "{}  {}  {}",
        record.id.as_str().dimmed(),
        record.display_timestamp.cyan(),
        record.label
    );
}
