//! File-backed blob store.

use async_trait::async_trait;

use nudge_core::{BlobStore, Result};

use crate::auth::FileAuth;
use crate::store::FileStore;

/// Blobs stored under the root's `blobs/` directory and addressed by
/// `file://` URL.
#[derive(Debug, Clone)]
pub struct FileBlobs {
    store: FileStore,
    auth: FileAuth,
}

impl FileBlobs {
    pub fn new(store: FileStore, auth: FileAuth) -> Self {
        Self { store, auth }
    }
}

#[async_trait]
impl BlobStore for FileBlobs {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        self.auth.require_user()?;
        let url = self.store.put_blob(path, &bytes).await?;
        Ok(url.to_string())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.auth.require_user()?;
        self.store.get_blob(url).await
    }
}
