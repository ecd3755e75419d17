//! Set command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use nudge_core::Avatar;

use crate::output;
use crate::session::ActiveSession;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Contact number
    #[arg(long)]
    pub contact: Option<String>,

    /// Hobby
    #[arg(long)]
    pub hobby: Option<String>,

    /// Image file to upload as the avatar
    #[arg(long)]
    pub avatar: Option<PathBuf>,
}

pub async fn run(args: SetArgs) -> Result<()> {
    if args.name.is_none() && args.contact.is_none() && args.hobby.is_none() && args.avatar.is_none()
    {
        bail!("Nothing to change; pass --name, --contact, --hobby or --avatar");
    }

    let avatar = match &args.avatar {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(Avatar::from_file_name(bytes, &file_name))
        }
        None => None,
    };

    let session = ActiveSession::resume().await?;
    let profiles = session.profiles();

    let mut profile = profiles
        .fetch()
        .await
        .context("Failed to fetch profile")?
        .unwrap_or_default();
    if let Some(name) = args.name {
        profile.name = name;
    }
    if let Some(contact) = args.contact {
        profile.contact_number = contact;
    }
    if let Some(hobby) = args.hobby {
        profile.hobby = hobby;
    }

    let saved = profiles
        .save(&profile, avatar)
        .await
        .context("Failed to save profile")?;
    session.persist().await?;

    output::success("Profile saved");
    if let Some(url) = &saved.avatar_url {
        output::field("Avatar", url);
    }

    Ok(())
}
