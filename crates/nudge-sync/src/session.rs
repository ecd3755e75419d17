//! Observed sign-in state.

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info};

use nudge_core::{AuthProvider, AuthState, Registration, UserId};

/// Single source of truth for who is signed in.
///
/// Registers one listener with the auth provider when created and
/// publishes the latest state on a watch channel. Dropping the session
/// releases the listener registration.
///
/// Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct AuthSession {
    state: watch::Receiver<AuthState>,
    _registration: Registration,
}

impl AuthSession {
    /// Start observing `provider`.
    pub fn observe(provider: &dyn AuthProvider) -> Self {
        let (registration, mut events) = provider.observe_state().into_parts();
        let (tx, rx) = watch::channel(provider.current_user());

        // Ends when the registration is dropped and the event stream closes.
        tokio::spawn(async move {
            while let Some(state) = events.next().await {
                let changed = tx.send_if_modified(|current| {
                    if *current == state {
                        return false;
                    }
                    *current = state.clone();
                    true
                });

                if changed {
                    match &state {
                        Some(user) => info!(%user, "Signed in"),
                        None => info!("Signed out"),
                    }
                }
            }
            debug!("Auth listener closed");
        });

        Self {
            state: rx,
            _registration: registration,
        }
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<UserId> {
        self.state.borrow().clone()
    }

    /// Returns true if a user is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    ///
    /// Returns the matching state, or `None` if the provider went away.
    pub async fn wait_for(&self, predicate: impl Fn(&AuthState) -> bool) -> Option<AuthState> {
        let mut rx = self.state.clone();
        rx.wait_for(|state| predicate(state))
            .await
            .ok()
            .map(|state| state.clone())
    }
}
