//! Password reset command implementation.

use anyhow::{Context, Result};
use clap::Args;

use nudge_core::Email;

use crate::backend::{BackendArgs, BackendSettings};
use crate::output;

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub async fn run(args: ResetPasswordArgs) -> Result<()> {
    let email = Email::new(&args.email).context("Invalid email")?;
    let backend = BackendSettings::from(args.backend).open()?;

    backend
        .auth
        .send_password_reset(&email)
        .await
        .context("Failed to request password reset")?;

    output::success(&format!("Password reset email sent to {email}"));
    Ok(())
}
