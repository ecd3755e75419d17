//! REST-backed auth provider.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use nudge_core::error::AuthError;
use nudge_core::{
    AccessToken, AuthListener, AuthProvider, Credentials, Email, Error, ListenerRegistry,
    RefreshToken, Result, SessionToken, UserId,
};

use crate::client::RestClient;
use crate::config::HttpConfig;
use crate::endpoints::{
    OobCodeRequest, PasswordRequest, PasswordResponse, RefreshResponse, SEND_OOB_CODE, SIGN_IN,
    SIGN_UP,
};

/// Email/password accounts over the hosted account API.
///
/// The ID token is kept in memory and presented by the document and blob
/// stores; when they get an expired-session answer they ask this provider to
/// refresh it once before giving up.
#[derive(Debug, Clone)]
pub struct HttpAuth {
    config: Arc<HttpConfig>,
    client: RestClient,
    session: Arc<RwLock<Option<SessionToken>>>,
    registry: ListenerRegistry,
}

impl HttpAuth {
    pub(crate) fn new(config: Arc<HttpConfig>, client: RestClient) -> Self {
        Self {
            config,
            client,
            session: Arc::new(RwLock::new(None)),
            registry: ListenerRegistry::new(),
        }
    }

    /// The current ID token, or `NotAuthenticated`.
    pub(crate) fn access_token(&self) -> Result<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.access_token.as_str().to_string())
            .ok_or(Error::NotAuthenticated)
    }

    /// Run `call` with the current ID token, refreshing it once if the
    /// service reports it expired.
    pub(crate) async fn with_token<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = self.access_token()?;
        match call(token).await {
            Err(Error::Auth(AuthError::SessionExpired)) => {
                let token = self.refresh().await?;
                call(token).await
            }
            other => other,
        }
    }

    /// Exchange the refresh token for a new ID token.
    ///
    /// If the refresh token is rejected the session ends.
    #[instrument(skip(self))]
    pub(crate) async fn refresh(&self) -> Result<String> {
        let (user, refresh_token) = {
            let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
            let session = session.as_ref().ok_or(Error::NotAuthenticated)?;
            let refresh_token = session
                .refresh_token
                .clone()
                .ok_or(AuthError::SessionExpired)?;
            (session.user_id.clone(), refresh_token)
        };

        match self.exchange(&user, &refresh_token).await {
            Ok(token) => {
                let id_token = token.access_token.as_str().to_string();
                self.set_session(Some(token));
                debug!(%user, "Refreshed ID token");
                Ok(id_token)
            }
            Err(err @ Error::Auth(AuthError::SessionExpired)) => {
                warn!(%user, "Refresh token rejected; signing out");
                self.set_session(None);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    async fn exchange(&self, user: &UserId, refresh_token: &RefreshToken) -> Result<SessionToken> {
        let response: RefreshResponse = self
            .client
            .post_form(
                self.config.token_refresh_url()?,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                ],
            )
            .await?;

        if response.user_id != user.as_str() {
            return Err(AuthError::SessionExpired.into());
        }

        Ok(SessionToken {
            user_id: user.clone(),
            access_token: AccessToken::new(response.id_token),
            refresh_token: Some(RefreshToken::new(response.refresh_token)),
        })
    }

    /// Replace the session and announce it if the user changed.
    fn set_session(&self, next: Option<SessionToken>) {
        let state = next.as_ref().map(|s| s.user_id.clone());
        let changed = {
            let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
            let changed = session.as_ref().map(|s| &s.user_id) != state.as_ref();
            *session = next;
            changed
        };

        if changed {
            self.registry.notify(&state);
        }
    }

    async fn password_call(&self, action: &str, credentials: &Credentials) -> Result<UserId> {
        let body = PasswordRequest {
            email: credentials.email().as_str(),
            password: credentials.password(),
            return_secure_token: true,
        };

        let response: PasswordResponse = self
            .client
            .post_json(self.config.accounts_url(action)?, &body, None)
            .await?;

        let user = UserId::new(response.local_id)?;
        self.set_session(Some(SessionToken {
            user_id: user.clone(),
            access_token: AccessToken::new(response.id_token),
            refresh_token: response.refresh_token.map(RefreshToken::new),
        }));

        debug!(%user, action, "Session started");
        Ok(user)
    }
}

#[async_trait]
impl AuthProvider for HttpAuth {
    fn observe_state(&self) -> AuthListener {
        self.registry.register(self.current_user())
    }

    fn current_user(&self) -> Option<UserId> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user_id.clone())
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<UserId> {
        self.password_call(SIGN_IN, credentials).await
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn sign_up(&self, credentials: &Credentials) -> Result<UserId> {
        self.password_call(SIGN_UP, credentials).await
    }

    async fn sign_out(&self) -> Result<()> {
        self.set_session(None);
        debug!("Session ended");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_password_reset(&self, email: &Email) -> Result<()> {
        let body = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email: email.as_str(),
        };

        let _: serde_json::Value = self
            .client
            .post_json(self.config.accounts_url(SEND_OOB_CODE)?, &body, None)
            .await?;

        debug!("Password reset requested");
        Ok(())
    }

    fn session_token(&self) -> Option<SessionToken> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resume a sign-in. With a refresh token the session is renewed right
    /// away, which also proves it is still valid.
    #[instrument(skip(self, token), fields(user = %token.user_id))]
    async fn restore(&self, token: SessionToken) -> Result<UserId> {
        let user = token.user_id.clone();

        let token = match token.refresh_token.clone() {
            Some(refresh_token) => self.exchange(&user, &refresh_token).await?,
            None => token,
        };

        self.set_session(Some(token));
        Ok(user)
    }
}
