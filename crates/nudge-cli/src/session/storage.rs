//! Session storage for persisting sign-in state.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;

use nudge_core::{AccessToken, RefreshToken, SessionToken, UserId};

use crate::backend::BackendSettings;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data: where the account lives and the tokens for it.
#[derive(Serialize, Deserialize)]
pub struct StoredSession {
    pub backend: BackendSettings,
    pub user_id: String,
    access_token: String,
    refresh_token: Option<String>,
}

impl StoredSession {
    pub fn new(backend: BackendSettings, token: &SessionToken) -> Self {
        Self {
            backend,
            user_id: token.user_id.to_string(),
            access_token: token.access_token.as_str().to_string(),
            refresh_token: token.refresh_token.as_ref().map(|t| t.as_str().to_string()),
        }
    }

    /// The tokens to hand back to the auth provider.
    pub fn token(&self) -> Result<SessionToken> {
        Ok(SessionToken {
            user_id: UserId::new(&self.user_id).context("Invalid user id in session")?,
            access_token: AccessToken::new(&self.access_token),
            refresh_token: self.refresh_token.as_deref().map(RefreshToken::new),
        })
    }
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("backend", &self.backend.url)
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "nudge").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("session.json"))
}

/// Save a session to disk.
pub async fn save_session(session: &StoredSession) -> Result<()> {
    let path = session_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .context("Failed to create data directory")?;
    }

    let json = serde_json::to_string_pretty(session)?;
    fs::write(&path, &json)
        .await
        .context("Failed to write session file")?;

    // Tokens are secrets
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path).await?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms).await?;
    }

    Ok(())
}

/// Load the session from disk, if there is one.
pub async fn load_session() -> Result<Option<StoredSession>> {
    let path = session_path()?;
    if !fs::try_exists(&path).await? {
        return Ok(None);
    }

    let json = fs::read_to_string(&path)
        .await
        .context("Failed to read session file")?;
    let stored = serde_json::from_str(&json).context("Invalid session file")?;
    Ok(Some(stored))
}

/// Clear the stored session.
pub async fn clear_session() -> Result<()> {
    let path = session_path()?;
    if fs::try_exists(&path).await? {
        fs::remove_file(&path)
            .await
            .context("Failed to remove session file")?;
    }
    Ok(())
}
