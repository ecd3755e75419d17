//! List command implementation.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::ActiveSession;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show reminders whose label contains this text (any case)
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Print one JSON object per reminder
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ListArgs) -> Result<()> {
    let session = ActiveSession::resume().await?;

    if let Some(err) = session.store.status().last_error {
        bail!("Failed to load reminders: {err}");
    }
    session.persist().await?;

    let records = session.store.filter(&args.filter);
    if records.is_empty() {
        eprintln!("{}", "No reminders found.".dimmed());
        return Ok(());
    }

    for record in &records {
        if args.json {
            output::json(record)?;
        } else {
            output::record_line(record);
        }
    }

    Ok(())
}
