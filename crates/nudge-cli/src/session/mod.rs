//! The signed-in session a command runs against.

pub mod storage;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use nudge_core::error::AuthError;
use nudge_core::{Backend, Error, SessionToken};
use nudge_sync::{AuthSession, FollowHandle, ProfileManager, RecordStore};

use crate::backend::BackendSettings;
use storage::StoredSession;

/// A resumed session with its record store loaded.
pub struct ActiveSession {
    pub settings: BackendSettings,
    pub backend: Backend,
    pub auth: AuthSession,
    pub store: RecordStore,
    _follow: FollowHandle,
}

impl ActiveSession {
    /// Restore the stored session and load the user's records.
    ///
    /// A failed initial load is not an error here; it is published in the
    /// store's status for commands that need the list.
    pub async fn resume() -> Result<Self> {
        let stored = storage::load_session()
            .await
            .context("Failed to load session")?
            .context("No active session. Run 'nudge account login' first.")?;

        let backend = stored.backend.open()?;
        let user = match backend.auth.restore(stored.token()?).await {
            Ok(user) => user,
            Err(err @ Error::Auth(AuthError::SessionExpired)) => {
                storage::clear_session().await?;
                return Err(err).context("Session expired. Run 'nudge account login' again.");
            }
            Err(err) => return Err(err).context("Failed to restore session"),
        };

        let auth = AuthSession::observe(backend.auth.as_ref());
        let store = RecordStore::new(backend.documents.clone(), stored.backend.sync_config());
        if let Err(err) = store.on_sign_in(user).await {
            warn!(error = %err, "Initial reload failed");
        }
        let follow = store.follow(&auth);

        Ok(Self {
            settings: stored.backend,
            backend,
            auth,
            store,
            _follow: follow,
        })
    }

    /// Profile access for the same user.
    pub fn profiles(&self) -> ProfileManager {
        ProfileManager::new(
            &self.auth,
            self.backend.documents.clone(),
            self.backend.blobs.clone(),
            self.settings.sync_config(),
        )
    }

    /// Store the current tokens, which a refresh may have replaced, or forget
    /// the session if it ended.
    pub async fn persist(&self) -> Result<()> {
        match self.backend.auth.session_token() {
            Some(token) => save(self.settings.clone(), &token).await,
            None => {
                debug!("Session ended; clearing stored session");
                storage::clear_session().await
            }
        }
    }
}

/// Remember a fresh sign-in.
pub async fn save(settings: BackendSettings, token: &SessionToken) -> Result<()> {
    storage::save_session(&StoredSession::new(settings, token))
        .await
        .context("Failed to save session")
}
