//! REST-backed blob store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use nudge_core::error::{InvalidInputError, RemoteError};
use nudge_core::{BlobStore, Error, Result};

use crate::auth::HttpAuth;
use crate::client::{RestClient, is_not_found};
use crate::config::HttpConfig;
use crate::endpoints::UploadResponse;

/// Objects in the project's storage bucket.
///
/// Uploads return a tokenised download URL, which works without a session.
/// The session's ID token is still sent when downloading from the
/// configured host.
#[derive(Debug, Clone)]
pub struct StorageBlobs {
    config: Arc<HttpConfig>,
    client: RestClient,
    auth: HttpAuth,
}

impl StorageBlobs {
    pub(crate) fn new(config: Arc<HttpConfig>, client: RestClient, auth: HttpAuth) -> Self {
        Self {
            config,
            client,
            auth,
        }
    }

    fn is_own_host(&self, url: &Url) -> bool {
        url.as_str().starts_with(self.config.storage_url.as_str())
    }
}

#[async_trait]
impl BlobStore for StorageBlobs {
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let mut url = self.config.objects_url()?;
        url.query_pairs_mut()
            .append_pair("name", path)
            .append_pair("uploadType", "media");

        let client = &self.client;
        let response: UploadResponse = self
            .auth
            .with_token(|token| {
                let url = url.clone();
                let bytes = bytes.clone();
                async move {
                    client
                        .post_bytes(url, bytes, content_type, Some(&token))
                        .await
                }
            })
            .await?;

        let token = response
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
            .ok_or_else(|| RemoteError::Decode {
                message: format!("upload of {} returned no download token", response.name),
            })?;

        let download = self.config.download_url(path, token)?;
        debug!(object = %response.name, "Uploaded blob");
        Ok(download.to_string())
    }

    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = Url::parse(url).map_err(|e| InvalidInputError::Field {
            name: "url".to_string(),
            reason: e.to_string(),
        })?;

        let result = if self.is_own_host(&parsed) && self.auth.access_token().is_ok() {
            let client = &self.client;
            self.auth
                .with_token(|token| {
                    let url = parsed.clone();
                    async move { client.get_bytes(url, Some(&token)).await }
                })
                .await
        } else {
            self.client.get_bytes(parsed, None).await
        };

        match result {
            Err(err) if is_not_found(&err) => Err(Error::BlobNotFound {
                url: url.to_string(),
            }),
            other => other,
        }
    }
}
