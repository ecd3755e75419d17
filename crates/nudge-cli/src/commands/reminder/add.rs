//! Add command implementation.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args;

use nudge_core::RecordDraft;

use super::parse_time;
use crate::output;
use crate::session::ActiveSession;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// What to be reminded of
    pub label: String,

    /// When, as "YYYY-MM-DD HH:MM" local time or RFC 3339
    #[arg(long, value_parser = parse_time)]
    pub at: DateTime<Local>,
}

pub async fn run(args: AddArgs) -> Result<()> {
    let session = ActiveSession::resume().await?;

    let id = session
        .store
        .create(RecordDraft::new(args.label, args.at))
        .await
        .context("Failed to create reminder")?;
    session.persist().await?;

    output::success("Reminder created");
    output::field("Id", id.as_str());
    if let Some(record) = session.store.records().iter().find(|r| r.id == id) {
        output::field("Due", &record.display_timestamp);
    }

    Ok(())
}
