//! Blob store trait.

use async_trait::async_trait;

use crate::Result;

/// Binary object storage addressed by path on upload and by URL on download.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`, replacing any existing object, and return a
    /// URL from which it can be downloaded.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Fetch the bytes behind a URL returned by [`upload`](BlobStore::upload).
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
