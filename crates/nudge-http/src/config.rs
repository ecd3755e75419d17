//! REST backend settings.

use std::time::Duration;

use url::Url;

use nudge_core::error::InvalidInputError;
use nudge_core::{Error, Result};

/// Default host of the account API.
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/";
/// Default host of the token refresh API.
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/";
/// Default host of the document API.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/";
/// Default host of the blob API.
pub const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com/";

/// Per-request limit applied by the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the REST APIs.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Web API key sent as `?key=` on auth calls.
    pub api_key: String,
    /// Project whose database is used.
    pub project_id: String,
    /// Storage bucket; defaults to `<project>.appspot.com`.
    pub bucket: Option<String>,
    pub auth_url: Url,
    pub token_url: Url,
    pub firestore_url: Url,
    pub storage_url: Url,
    pub request_timeout: Duration,
}

impl HttpConfig {
    /// Settings for the hosted APIs.
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            bucket: None,
            auth_url: default_url(DEFAULT_AUTH_URL),
            token_url: default_url(DEFAULT_TOKEN_URL),
            firestore_url: default_url(DEFAULT_FIRESTORE_URL),
            storage_url: default_url(DEFAULT_STORAGE_URL),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Serve every API from one gateway or emulator.
    pub fn with_base_url(mut self, base: Url) -> Self {
        self.auth_url = base.clone();
        self.token_url = base.clone();
        self.firestore_url = base.clone();
        self.storage_url = base;
        self
    }

    /// Use a specific storage bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Replace the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The storage bucket in use.
    pub fn bucket(&self) -> String {
        self.bucket
            .clone()
            .unwrap_or_else(|| format!("{}.appspot.com", self.project_id))
    }

    /// `{auth}/v1/accounts:<action>?key=<api key>`
    pub(crate) fn accounts_url(&self, action: &str) -> Result<Url> {
        let mut url = endpoint(&self.auth_url, &["v1", &format!("accounts:{action}")])?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// `{token}/v1/token?key=<api key>`
    pub(crate) fn token_refresh_url(&self) -> Result<Url> {
        let mut url = endpoint(&self.token_url, &["v1", "token"])?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn documents_root(&self) -> [&str; 6] {
        [
            "v1",
            "projects",
            &self.project_id,
            "databases",
            "(default)",
            "documents",
        ]
    }

    /// `{firestore}/v1/projects/<p>/databases/(default)/documents:runQuery`
    pub(crate) fn run_query_url(&self) -> Result<Url> {
        let mut segments = self.documents_root();
        segments[5] = "documents:runQuery";
        endpoint(&self.firestore_url, &segments)
    }

    /// `{firestore}/v1/projects/<p>/databases/(default)/documents/<c>/<id>`
    pub(crate) fn document_url(&self, collection: &str, id: &str) -> Result<Url> {
        let root = self.documents_root();
        let segments: Vec<&str> = root.iter().copied().chain([collection, id]).collect();
        endpoint(&self.firestore_url, &segments)
    }

    /// Resource name of a document, as used inside query responses.
    pub(crate) fn document_prefix(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents/",
            self.project_id
        )
    }

    /// `{storage}/v0/b/<bucket>/o`
    pub(crate) fn objects_url(&self) -> Result<Url> {
        endpoint(&self.storage_url, &["v0", "b", &self.bucket(), "o"])
    }

    /// `{storage}/v0/b/<bucket>/o/<escaped path>?alt=media&token=<token>`
    pub(crate) fn download_url(&self, path: &str, token: &str) -> Result<Url> {
        let mut url = endpoint(&self.storage_url, &["v0", "b", &self.bucket(), "o", path])?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url)
    }
}

fn default_url(s: &str) -> Url {
    Url::parse(s).expect("default URLs are valid")
}

/// Append path segments to a base URL, escaping each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| -> Error {
            InvalidInputError::BackendUrl {
                value: base.to_string(),
                reason: "cannot be a base URL".to_string(),
            }
            .into()
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HttpConfig {
        HttpConfig::new("key123", "demo")
    }

    #[test]
    fn accounts_url_carries_key() {
        let url = config().accounts_url("signInWithPassword").unwrap();
        assert_eq!(
            url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=key123"
        );
    }

    #[test]
    fn document_urls_address_the_default_database() {
        let config = config();
        assert_eq!(
            config.document_url("reminders", "r1").unwrap().as_str(),
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents/reminders/r1"
        );
        assert!(
            config
                .run_query_url()
                .unwrap()
                .as_str()
                .ends_with("/databases/(default)/documents:runQuery")
        );
    }

    #[test]
    fn download_url_escapes_object_path() {
        let url = config()
            .download_url("profileImages/u1.png", "tok")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/profileImages%2Fu1.png?alt=media&token=tok"
        );
    }

    #[test]
    fn base_url_applies_to_every_api() {
        let base = Url::parse("http://localhost:9099/gateway/").unwrap();
        let config = config().with_base_url(base).with_bucket("bucket");
        assert!(
            config
                .token_refresh_url()
                .unwrap()
                .as_str()
                .starts_with("http://localhost:9099/gateway/v1/token")
        );
        assert_eq!(
            config.objects_url().unwrap().as_str(),
            "http://localhost:9099/gateway/v0/b/bucket/o"
        );
    }
}
