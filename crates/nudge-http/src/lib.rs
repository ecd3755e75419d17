//! nudge-http - REST-backed backend.
//!
//! Talks to the hosted account, document and blob APIs (or an emulator or
//! gateway serving them under one base URL). Accounts use email and
//! password; the ID token obtained at sign-in is presented on every document
//! and blob call and refreshed once when the service reports it expired.

mod auth;
mod client;
mod config;
mod endpoints;
mod firestore;
mod storage;

use std::sync::Arc;

use nudge_core::{Backend, Result};

pub use auth::HttpAuth;
pub use config::{
    DEFAULT_AUTH_URL, DEFAULT_FIRESTORE_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STORAGE_URL,
    DEFAULT_TOKEN_URL, HttpConfig,
};
pub use firestore::FirestoreDocuments;
pub use storage::StorageBlobs;

use client::RestClient;

/// The REST auth, document and blob stores sharing one client and session.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: Arc<HttpConfig>,
    client: RestClient,
    auth: HttpAuth,
}

impl HttpBackend {
    /// Build the HTTP client and an empty session.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let config = Arc::new(config);
        let client = RestClient::new(config.request_timeout)?;
        let auth = HttpAuth::new(config.clone(), client.clone());
        Ok(Self {
            config,
            client,
            auth,
        })
    }

    /// The settings in use.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// The auth provider, shared with the document and blob stores.
    pub fn auth(&self) -> &HttpAuth {
        &self.auth
    }

    /// Bundle the three stores for injection.
    pub fn into_backend(self) -> Backend {
        Backend {
            auth: Arc::new(self.auth.clone()),
            documents: Arc::new(FirestoreDocuments::new(
                self.config.clone(),
                self.client.clone(),
                self.auth.clone(),
            )),
            blobs: Arc::new(StorageBlobs::new(self.config, self.client, self.auth)),
        }
    }
}
