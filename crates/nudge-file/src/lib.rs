//! nudge-file - Filesystem-backed backend.
//!
//! Everything lives under one root directory: accounts with bcrypt password
//! hashes, one JSON file per document, blobs addressed by `file://` URL, and
//! an outbox log standing in for outgoing email. Meant for local use and
//! tests; several processes may share a root.

mod auth;
mod blobs;
mod documents;
mod store;

use std::path::Path;
use std::sync::Arc;

use nudge_core::Backend;

pub use auth::{FileAuth, MIN_PASSWORD_LEN};
pub use blobs::FileBlobs;
pub use documents::FileDocuments;
pub use store::{FileStore, LocalAccount, OutboxKind, OutboxMessage};

/// The file auth, document and blob stores over one root.
#[derive(Debug, Clone)]
pub struct FileBackend {
    store: FileStore,
    auth: FileAuth,
}

impl FileBackend {
    /// Open (or lazily create) a backend rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let store = FileStore::new(root);
        let auth = FileAuth::new(store.clone());
        Self { store, auth }
    }

    /// Use a different bcrypt cost for new passwords.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.auth = self.auth.with_hash_cost(cost);
        self
    }

    /// The underlying storage.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// The auth provider, shared with the document and blob stores.
    pub fn auth(&self) -> &FileAuth {
        &self.auth
    }

    /// Bundle the three stores for injection.
    pub fn into_backend(self) -> Backend {
        Backend {
            auth: Arc::new(self.auth.clone()),
            documents: Arc::new(FileDocuments::new(self.store.clone(), self.auth.clone())),
            blobs: Arc::new(FileBlobs::new(self.store, self.auth)),
        }
    }
}
