//! Account subcommand implementations.

mod login;
mod logout;
mod reset_password;
mod sign_up;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountSubcommand {
    /// Create an account and sign in
    SignUp(sign_up::SignUpArgs),

    /// Sign in to an existing account
    Login(login::LoginArgs),

    /// Sign out and forget the stored session
    Logout(logout::LogoutArgs),

    /// Send a password reset email
    ResetPassword(reset_password::ResetPasswordArgs),

    /// Display the active session
    Whoami(whoami::WhoamiArgs),
}

pub async fn handle(cmd: AccountCommand) -> Result<()> {
    match cmd.command {
        AccountSubcommand::SignUp(args) => sign_up::run(args).await,
        AccountSubcommand::Login(args) => login::run(args).await,
        AccountSubcommand::Logout(args) => logout::run(args).await,
        AccountSubcommand::ResetPassword(args) => reset_password::run(args).await,
        AccountSubcommand::Whoami(args) => whoami::run(args).await,
    }
}
