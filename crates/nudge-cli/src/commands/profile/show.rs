//! Show command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::ActiveSession;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Save the avatar image to this file
    #[arg(long)]
    pub avatar_out: Option<PathBuf>,

    /// Pretty-print as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ShowArgs) -> Result<()> {
    let session = ActiveSession::resume().await?;
    let profiles = session.profiles();

    let profile = profiles.fetch().await.context("Failed to fetch profile")?;
    session.persist().await?;

    let Some(profile) = profile else {
        eprintln!("{}", "No profile yet. Run 'nudge profile set'.".dimmed());
        return Ok(());
    };

    if args.json {
        output::json_pretty(&profile)?;
    } else {
        output::field("Name", &profile.name);
        output::field("Contact", &profile.contact_number);
        output::field("Hobby", &profile.hobby);
        output::field("Avatar", profile.avatar_url.as_deref().unwrap_or("-"));
    }

    if let Some(path) = args.avatar_out {
        match profiles
            .fetch_avatar(&profile)
            .await
            .context("Failed to download avatar")?
        {
            Some(bytes) => {
                tokio::fs::write(&path, bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("{} {}", "Avatar saved to".dimmed(), path.display());
            }
            None => output::warning("Profile has no avatar"),
        }
    }

    Ok(())
}
