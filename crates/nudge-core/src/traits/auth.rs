//! Auth provider trait.

use async_trait::async_trait;

use crate::listeners::AuthListener;
use crate::tokens::SessionToken;
use crate::types::{Email, UserId};
use crate::{Credentials, Result};

/// An external authentication provider.
///
/// Providers keep the current sign-in state and announce every change to
/// the listeners obtained from [`observe_state`](AuthProvider::observe_state).
/// Only terminal states are announced: a signed-in user id, or `None`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a listener. The current state is delivered first, then every
    /// change until the listener is dropped.
    fn observe_state(&self) -> AuthListener;

    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<UserId>;

    /// Sign in with email and password.
    async fn sign_in(&self, credentials: &Credentials) -> Result<UserId>;

    /// Create an account and sign in as it.
    async fn sign_up(&self, credentials: &Credentials) -> Result<UserId>;

    /// Sign out. Signing out while signed out succeeds.
    async fn sign_out(&self) -> Result<()>;

    /// Ask the provider to send a password reset message.
    async fn send_password_reset(&self, email: &Email) -> Result<()>;

    /// Export the current sign-in for persistence.
    fn session_token(&self) -> Option<SessionToken>;

    /// Resume a previously exported sign-in.
    async fn restore(&self, token: SessionToken) -> Result<UserId>;
}
