//! HTTP client shared by the REST stores.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};
use url::Url;

use nudge_core::error::{AuthError, RemoteError};
use nudge_core::{Error, Result};

use crate::endpoints::{ErrorBody, ErrorResponse};

/// Thin wrapper over `reqwest` that speaks the APIs' JSON and error
/// conventions.
#[derive(Debug, Clone)]
pub(crate) struct RestClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl RestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nudge/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Connection {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, timeout })
    }

    /// POST a JSON body and decode a JSON answer.
    #[instrument(skip_all, fields(path = url.path()))]
    pub async fn post_json<B, R>(&self, url: Url, body: &B, token: Option<&str>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST");
        let request = self.client.post(url).json(body);
        let response = self.send(authorize(request, token)).await?;
        self.decode(response).await
    }

    /// POST a form body and decode a JSON answer.
    #[instrument(skip_all, fields(path = url.path()))]
    pub async fn post_form<R>(&self, url: Url, form: &[(&str, &str)]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!("POST form");
        let response = self.send(self.client.post(url).form(form)).await?;
        self.decode(response).await
    }

    /// POST raw bytes and decode a JSON answer.
    #[instrument(skip_all, fields(path = url.path(), len = bytes.len()))]
    pub async fn post_bytes<R>(
        &self,
        url: Url,
        bytes: Vec<u8>,
        content_type: &str,
        token: Option<&str>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!("POST bytes");
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        let response = self.send(authorize(request, token)).await?;
        self.decode(response).await
    }

    /// GET a JSON document; `None` on 404.
    #[instrument(skip_all, fields(path = url.path()))]
    pub async fn get_json<R>(&self, url: Url, token: Option<&str>) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        debug!("GET");
        match self.send(authorize(self.client.get(url), token)).await {
            Ok(response) => self.decode(response).await.map(Some),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// GET raw bytes.
    #[instrument(skip_all, fields(path = url.path()))]
    pub async fn get_bytes(&self, url: Url, token: Option<&str>) -> Result<Vec<u8>> {
        debug!("GET bytes");
        let response = self.send(authorize(self.client.get(url), token)).await?;
        let bytes = response.bytes().await.map_err(|e| self.map_transport(e))?;
        Ok(bytes.to_vec())
    }

    /// PATCH a JSON body and decode a JSON answer.
    #[instrument(skip_all, fields(path = url.path()))]
    pub async fn patch_json<B, R>(&self, url: Url, body: &B, token: Option<&str>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("PATCH");
        let request = self.client.patch(url).json(body);
        let response = self.send(authorize(request, token)).await?;
        self.decode(response).await
    }

    /// DELETE a resource.
    #[instrument(skip_all, fields(path = url.path()))]
    pub async fn delete(&self, url: Url, token: Option<&str>) -> Result<()> {
        debug!("DELETE");
        self.send(authorize(self.client.delete(url), token)).await?;
        Ok(())
    }

    /// Send a request, turning transport failures and error statuses into
    /// [`Error`]s.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        trace!(status = %status, "Response");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .map(|envelope| envelope.error);
            Err(classify(status, body))
        }
    }

    async fn decode<R: DeserializeOwned>(&self, response: Response) -> Result<R> {
        response.json::<R>().await.map_err(|e| {
            if e.is_decode() {
                RemoteError::Decode {
                    message: e.to_string(),
                }
                .into()
            } else {
                self.map_transport(e)
            }
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            RemoteError::Timeout {
                duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
            .into()
        } else {
            RemoteError::Connection {
                message: err.to_string(),
            }
            .into()
        }
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
        None => request,
    }
}

pub(crate) fn is_not_found(err: &Error) -> bool {
    matches!(
        err,
        Error::RemoteUnavailable(RemoteError::Http { status: 404, .. })
    )
}

/// Map an error status and optional error body onto the error taxonomy.
///
/// Account API failures carry a code such as `EMAIL_EXISTS` in `message`,
/// sometimes followed by ` : <detail>`.
pub(crate) fn classify(status: StatusCode, body: Option<ErrorBody>) -> Error {
    let message = body
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
    let (code, detail) = match message.split_once(" : ") {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };

    match code {
        "EMAIL_EXISTS" => return AuthError::EmailInUse.into(),
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => return AuthError::UserNotFound.into(),
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            return AuthError::InvalidCredentials.into();
        }
        "WEAK_PASSWORD" => {
            return AuthError::WeakPassword {
                reason: if detail.is_empty() {
                    "password rejected".to_string()
                } else {
                    detail.to_string()
                },
            }
            .into();
        }
        "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "INVALID_REFRESH_TOKEN" | "USER_DISABLED" => {
            return AuthError::SessionExpired.into();
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => return AuthError::TooManyAttempts.into(),
        _ => {}
    }

    match status {
        StatusCode::UNAUTHORIZED => AuthError::SessionExpired.into(),
        StatusCode::FORBIDDEN => AuthError::PermissionDenied.into(),
        StatusCode::TOO_MANY_REQUESTS => AuthError::TooManyAttempts.into(),
        _ => RemoteError::Http {
            status: status.as_u16(),
            message,
        }
        .into(),
    }
}
