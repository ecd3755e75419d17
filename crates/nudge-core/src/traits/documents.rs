//! Document store trait.

use async_trait::async_trait;

use crate::Result;
use crate::document::{Document, DocumentRef, Fields, Filter};
use crate::types::{Collection, RecordId};

/// A remote document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` matching `filter`.
    async fn query(&self, collection: &Collection, filter: &Filter) -> Result<Vec<Document>>;

    /// Fetch one document by key.
    async fn get(&self, reference: &DocumentRef) -> Result<Option<Document>>;

    /// Create or fully replace the document `collection/id`.
    async fn write(&self, collection: &Collection, id: &RecordId, fields: &Fields) -> Result<()>;

    /// Overwrite the given fields of an existing document, keeping the rest.
    ///
    /// Fails with [`Error::RecordNotFound`](crate::Error::RecordNotFound)
    /// when the document does not exist.
    async fn update(&self, reference: &DocumentRef, fields: &Fields) -> Result<()>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, reference: &DocumentRef) -> Result<()>;
}
