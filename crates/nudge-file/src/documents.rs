//! File-backed document store.

use async_trait::async_trait;
use tracing::instrument;

use nudge_core::{
    Collection, Document, DocumentRef, DocumentStore, Fields, Filter, RecordId, Result,
};

use crate::auth::FileAuth;
use crate::store::FileStore;

/// Documents stored as one JSON file each, readable by signed-in users.
#[derive(Debug, Clone)]
pub struct FileDocuments {
    store: FileStore,
    auth: FileAuth,
}

impl FileDocuments {
    pub fn new(store: FileStore, auth: FileAuth) -> Self {
        Self { store, auth }
    }
}

#[async_trait]
impl DocumentStore for FileDocuments {
    #[instrument(skip_all, fields(%collection))]
    async fn query(&self, collection: &Collection, filter: &Filter) -> Result<Vec<Document>> {
        self.auth.require_user()?;
        self.store.query(collection, filter)
    }

    #[instrument(skip_all, fields(%reference))]
    async fn get(&self, reference: &DocumentRef) -> Result<Option<Document>> {
        self.auth.require_user()?;
        self.store.get_document(reference)
    }

    #[instrument(skip_all, fields(%collection, %id))]
    async fn write(&self, collection: &Collection, id: &RecordId, fields: &Fields) -> Result<()> {
        self.auth.require_user()?;
        let reference = DocumentRef::new(collection.clone(), id.clone());
        self.store.write_document(&reference, fields)
    }

    #[instrument(skip_all, fields(%reference))]
    async fn update(&self, reference: &DocumentRef, fields: &Fields) -> Result<()> {
        self.auth.require_user()?;
        self.store.update_document(reference, fields)
    }

    #[instrument(skip_all, fields(%reference))]
    async fn delete(&self, reference: &DocumentRef) -> Result<()> {
        self.auth.require_user()?;
        self.store.delete_document(reference)
    }
}
