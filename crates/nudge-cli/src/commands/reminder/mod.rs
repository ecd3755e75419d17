//! Reminder subcommand implementations.

mod add;
mod edit;
mod list;
mod remove;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct ReminderCommand {
    #[command(subcommand)]
    pub command: ReminderSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ReminderSubcommand {
    /// Create a reminder
    Add(add::AddArgs),

    /// Change a reminder's label or time
    Edit(edit::EditArgs),

    /// Delete a reminder
    Remove(remove::RemoveArgs),

    /// List reminders, soonest first
    List(list::ListArgs),
}

pub async fn handle(cmd: ReminderCommand) -> Result<()> {
    match cmd.command {
        ReminderSubcommand::Add(args) => add::run(args).await,
        ReminderSubcommand::Edit(args) => edit::run(args).await,
        ReminderSubcommand::Remove(args) => remove::run(args).await,
        ReminderSubcommand::List(args) => list::run(args).await,
    }
}

/// Accepted local-time format for `--at`, besides RFC 3339.
const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse `--at`: RFC 3339, or `YYYY-MM-DD HH:MM` in local time.
pub(crate) fn parse_time(s: &str) -> Result<DateTime<Local>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(s, LOCAL_FORMAT)
        .map_err(|_| format!("expected \"YYYY-MM-DD HH:MM\" or RFC 3339, got {s:?}"))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("{s:?} does not exist in the local time zone"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_local_time() {
        let at = parse_time("2030-01-02 09:30").unwrap();
        assert_eq!(at.naive_local().to_string(), "2030-01-02 09:30:00");
    }

    #[test]
    fn test_parse_rfc3339() {
        let at = parse_time("2030-01-02T09:30:00Z").unwrap();
        assert_eq!(at.with_timezone(&chrono::Utc).hour(), 9);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_time("tomorrow").is_err());
        assert!(parse_time("2030-13-01 09:00").is_err());
    }
}
