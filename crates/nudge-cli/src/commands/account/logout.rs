//! Logout command implementation.

use anyhow::Result;
use clap::Args;
use tracing::warn;

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs) -> Result<()> {
    let Some(stored) = storage::load_session().await? else {
        output::success("Already signed out");
        return Ok(());
    };

    // Sessions are client-side; signing out just drops the tokens.
    match stored.backend.open() {
        Ok(backend) => {
            if let Err(err) = backend.auth.sign_out().await {
                warn!(error = %err, "Sign-out failed");
            }
        }
        Err(err) => warn!(error = %err, "Could not open backend for sign-out"),
    }

    storage::clear_session().await?;
    output::success("Signed out");
    Ok(())
}
