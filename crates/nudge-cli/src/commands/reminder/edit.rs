//! Edit command implementation.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use clap::Args;

use nudge_core::{RecordDraft, RecordId};

use super::parse_time;
use crate::output;
use crate::session::ActiveSession;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Reminder id
    pub id: String,

    /// New label
    #[arg(long)]
    pub label: Option<String>,

    /// New time, as "YYYY-MM-DD HH:MM" local time or RFC 3339
    #[arg(long, value_parser = parse_time)]
    pub at: Option<DateTime<Local>>,
}

pub async fn run(args: EditArgs) -> Result<()> {
    if args.label.is_none() && args.at.is_none() {
        bail!("Nothing to change; pass --label and/or --at");
    }

    let id = RecordId::new(&args.id).context("Invalid reminder id")?;
    let session = ActiveSession::resume().await?;

    let record = session
        .store
        .records()
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .with_context(|| format!("No reminder with id {id}"))?;
    session.store.select_for_edit(record.clone());

    let draft = RecordDraft::new(
        args.label.unwrap_or(record.label),
        args.at.unwrap_or(record.reminder_time),
    );
    session
        .store
        .update(&id, draft)
        .await
        .context("Failed to update reminder")?;
    session.persist().await?;

    output::success("Reminder updated");
    if let Some(updated) = session.store.selection() {
        output::field("Label", &updated.label);
        output::field("Due", &updated.display_timestamp);
    }

    Ok(())
}
