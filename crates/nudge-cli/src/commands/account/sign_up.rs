//! Sign-up command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use nudge_core::{Credentials, Email};

use crate::backend::{BackendArgs, BackendSettings};
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct SignUpArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "NUDGE_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub async fn run(args: SignUpArgs) -> Result<()> {
    let email = Email::new(&args.email).context("Invalid email")?;
    let settings = BackendSettings::from(args.backend);
    let backend = settings.open()?;

    eprintln!("{}", "Creating account...".dimmed());

    let user = backend
        .auth
        .sign_up(&Credentials::new(email.clone(), args.password))
        .await
        .context("Failed to create account")?;

    let token = backend
        .auth
        .session_token()
        .context("Account created but no session was issued")?;
    session::save(settings.clone(), &token).await?;

    output::success("Account created");
    println!();
    output::field("User", user.as_str());
    output::field("Email", email.as_str());
    output::field("Backend", &settings.url);

    Ok(())
}
