//! Profile subcommand implementations.

mod set;
mod show;

use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileSubcommand {
    /// Show the profile
    Show(show::ShowArgs),

    /// Change profile fields or the avatar
    Set(set::SetArgs),
}

pub async fn handle(cmd: ProfileCommand) -> Result<()> {
    match cmd.command {
        ProfileSubcommand::Show(args) => show::run(args).await,
        ProfileSubcommand::Set(args) => set::run(args).await,
    }
}
