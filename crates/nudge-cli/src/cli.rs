//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::account::AccountCommand;
use crate::commands::profile::ProfileCommand;
use crate::commands::reminder::ReminderCommand;

/// Reminders synced to a remote store.
#[derive(Parser, Debug)]
#[command(name = "nudge")]
#[command(author, version = env!("NUDGE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign up, sign in and manage the session
    Account(AccountCommand),

    /// Create, edit, remove and list reminders
    Reminder(ReminderCommand),

    /// Show or edit the profile
    Profile(ProfileCommand),
}
