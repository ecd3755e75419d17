//! File-backed auth provider.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use serde_json::json;
use tracing::{debug, instrument};

use nudge_core::error::{AuthError, InvalidInputError};
use nudge_core::{
    AccessToken, AuthListener, AuthProvider, Credentials, Email, Error, ListenerRegistry, Result,
    SessionToken, UserId,
};

use crate::store::{FileStore, LocalAccount, OutboxKind};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct SignedIn {
    user: UserId,
    token: AccessToken,
}

/// Accounts kept on disk with bcrypt password hashes.
///
/// Sessions are held in memory; [`session_token`](AuthProvider::session_token)
/// exports one for persistence and [`restore`](AuthProvider::restore) checks it
/// against the stored account.
#[derive(Debug, Clone)]
pub struct FileAuth {
    store: FileStore,
    registry: ListenerRegistry,
    current: Arc<Mutex<Option<SignedIn>>>,
    hash_cost: u32,
}

impl FileAuth {
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            registry: ListenerRegistry::new(),
            current: Arc::new(Mutex::new(None)),
            hash_cost: DEFAULT_COST,
        }
    }

    /// Use a different bcrypt cost for new passwords.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn make_token(uid: &UserId, password_hash: &str) -> AccessToken {
        let token = json!({
            "uid": uid.as_str(),
            "password_hash": password_hash,
        })
        .to_string();
        AccessToken::new(token)
    }

    fn parse_token(token: &AccessToken) -> Result<(UserId, String)> {
        let value: serde_json::Value = serde_json::from_str(token.as_str()).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("Invalid token JSON: {}", e),
            })
        })?;

        let uid = value.get("uid").and_then(|v| v.as_str()).ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::Other {
                message: "Token missing 'uid'".to_string(),
            })
        })?;

        let password_hash = value
            .get("password_hash")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                Error::InvalidInput(InvalidInputError::Other {
                    message: "Token missing 'password_hash'".to_string(),
                })
            })?;

        Ok((UserId::new(uid)?, password_hash.to_string()))
    }

    /// The signed-in user, or `NotAuthenticated`.
    pub(crate) fn require_user(&self) -> Result<UserId> {
        self.current_user().ok_or(Error::NotAuthenticated)
    }

    fn find(&self, email: &Email) -> Result<LocalAccount> {
        self.store
            .find_account_by_email(email)?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    /// Replace the session and announce it if the user changed.
    fn set_current(&self, next: Option<SignedIn>) {
        let state = next.as_ref().map(|s| s.user.clone());
        let changed = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = current.as_ref().map(|s| &s.user) != state.as_ref();
            *current = next;
            changed
        };

        if changed {
            self.registry.notify(&state);
        }
    }

    fn sign_in_as(&self, account: &LocalAccount) -> Result<UserId> {
        let user = UserId::new(&account.uid)?;
        let token = Self::make_token(&user, &account.password_hash);
        self.set_current(Some(SignedIn {
            user: user.clone(),
            token,
        }));
        debug!(%user, "Session started");
        Ok(user)
    }
}

fn map_bcrypt(err: bcrypt::BcryptError) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: err.to_string(),
    })
}

#[async_trait]
impl AuthProvider for FileAuth {
    fn observe_state(&self) -> AuthListener {
        self.registry.register(self.current_user())
    }

    fn current_user(&self) -> Option<UserId> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.clone())
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<UserId> {
        let account = self.find(credentials.email())?;

        let ok = verify(credentials.password(), &account.password_hash).map_err(map_bcrypt)?;
        if !ok {
            return Err(AuthError::InvalidCredentials.into());
        }

        self.sign_in_as(&account)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn sign_up(&self, credentials: &Credentials) -> Result<UserId> {
        if credentials.password().chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                reason: format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            }
            .into());
        }

        let password_hash = hash(credentials.password(), self.hash_cost).map_err(map_bcrypt)?;
        let account = self
            .store
            .create_account(credentials.email(), &password_hash)?;

        self.sign_in_as(&account)
    }

    async fn sign_out(&self) -> Result<()> {
        self.set_current(None);
        debug!("Session ended");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_password_reset(&self, email: &Email) -> Result<()> {
        self.find(email)?;
        self.store.append_outbox(email, OutboxKind::PasswordReset)?;
        debug!("Password reset queued");
        Ok(())
    }

    fn session_token(&self) -> Option<SessionToken> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| SessionToken {
                user_id: s.user.clone(),
                access_token: s.token.clone(),
                refresh_token: None,
            })
    }

    #[instrument(skip(self, token), fields(user = %token.user_id))]
    async fn restore(&self, token: SessionToken) -> Result<UserId> {
        let (uid, password_hash) = Self::parse_token(&token.access_token)?;

        let account = self
            .store
            .get_account(&uid)?
            .filter(|account| uid == token.user_id && account.password_hash == password_hash)
            .ok_or(AuthError::SessionExpired)?;

        self.sign_in_as(&account)
    }
}
