//! Remove command implementation.

use anyhow::{Context, Result};
use clap::Args;

use nudge_core::RecordId;

use crate::output;
use crate::session::ActiveSession;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Reminder id
    pub id: String,
}

pub async fn run(args: RemoveArgs) -> Result<()> {
    let id = RecordId::new(&args.id).context("Invalid reminder id")?;
    let session = ActiveSession::resume().await?;

    session
        .store
        .delete(&id)
        .await
        .context("Failed to delete reminder")?;
    session.persist().await?;

    output::success(&format!("Reminder {id} removed"));
    Ok(())
}
