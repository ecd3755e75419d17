//! Backend traits for auth, documents and blobs.

mod auth;
mod blobs;
mod documents;

use std::sync::Arc;

pub use auth::AuthProvider;
pub use blobs::BlobStore;
pub use documents::DocumentStore;

/// The three remote collaborators, bundled for injection.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("signed_in", &self.auth.current_user().is_some())
            .finish_non_exhaustive()
    }
}
