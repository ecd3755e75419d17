//! REST-backed document store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use nudge_core::{
    Collection, Document, DocumentRef, DocumentStore, Error, Fields, Filter, RecordId, Result,
};

use crate::auth::HttpAuth;
use crate::client::{RestClient, is_not_found};
use crate::config::HttpConfig;
use crate::endpoints::{
    ApiDocument, CollectionSelector, DocumentBody, FieldFilter, FieldReference, QueryFilter,
    RunQueryItem, RunQueryRequest, StructuredQuery,
};

/// Documents in the project's default database.
#[derive(Debug, Clone)]
pub struct FirestoreDocuments {
    config: Arc<HttpConfig>,
    client: RestClient,
    auth: HttpAuth,
}

impl FirestoreDocuments {
    pub(crate) fn new(config: Arc<HttpConfig>, client: RestClient, auth: HttpAuth) -> Self {
        Self {
            config,
            client,
            auth,
        }
    }

    /// Turn an API document into ours, if its name is a document in
    /// `collection`.
    fn convert(&self, collection: &Collection, document: ApiDocument) -> Option<Document> {
        let relative = document.name.strip_prefix(&self.config.document_prefix())?;
        let (name, id) = relative.rsplit_once('/')?;
        if name != collection.as_str() {
            return None;
        }

        let id = match RecordId::new(id) {
            Ok(id) => id,
            Err(err) => {
                warn!(name = %document.name, error = %err, "Skipping document with unusable id");
                return None;
            }
        };

        Some(Document {
            reference: DocumentRef::new(collection.clone(), id),
            fields: document.fields,
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocuments {
    #[instrument(skip_all, fields(%collection, field = %filter.field))]
    async fn query(&self, collection: &Collection, filter: &Filter) -> Result<Vec<Document>> {
        let url = self.config.run_query_url()?;
        let body = RunQueryRequest {
            structured_query: StructuredQuery {
                from: [CollectionSelector {
                    collection_id: collection.as_str(),
                }],
                filter: QueryFilter {
                    field_filter: FieldFilter {
                        field: FieldReference {
                            field_path: &filter.field,
                        },
                        op: "EQUAL",
                        value: &filter.value,
                    },
                },
            },
        };

        let client = &self.client;
        let items: Vec<RunQueryItem> = self
            .auth
            .with_token(|token| {
                let url = url.clone();
                let body = &body;
                async move { client.post_json(url, body, Some(&token)).await }
            })
            .await?;

        let documents: Vec<Document> = items
            .into_iter()
            .filter_map(|item| item.document)
            .filter_map(|document| self.convert(collection, document))
            .collect();

        debug!(count = documents.len(), "Queried documents");
        Ok(documents)
    }

    #[instrument(skip_all, fields(%reference))]
    async fn get(&self, reference: &DocumentRef) -> Result<Option<Document>> {
        let url = self
            .config
            .document_url(reference.collection.as_str(), reference.id.as_str())?;

        let client = &self.client;
        let document: Option<ApiDocument> = self
            .auth
            .with_token(|token| {
                let url = url.clone();
                async move { client.get_json(url, Some(&token)).await }
            })
            .await?;

        Ok(document.map(|document| Document {
            reference: reference.clone(),
            fields: document.fields,
        }))
    }

    #[instrument(skip_all, fields(%collection, %id))]
    async fn write(&self, collection: &Collection, id: &RecordId, fields: &Fields) -> Result<()> {
        let url = self
            .config
            .document_url(collection.as_str(), id.as_str())?;
        let body = DocumentBody { fields };

        let client = &self.client;
        let _: serde_json::Value = self
            .auth
            .with_token(|token| {
                let url = url.clone();
                let body = &body;
                async move { client.patch_json(url, body, Some(&token)).await }
            })
            .await?;

        debug!("Wrote document");
        Ok(())
    }

    #[instrument(skip_all, fields(%reference))]
    async fn update(&self, reference: &DocumentRef, fields: &Fields) -> Result<()> {
        let mut url = self
            .config
            .document_url(reference.collection.as_str(), reference.id.as_str())?;
        {
            let mut query = url.query_pairs_mut();
            for name in fields.names() {
                query.append_pair("updateMask.fieldPaths", name);
            }
            query.append_pair("currentDocument.exists", "true");
        }
        let body = DocumentBody { fields };

        let client = &self.client;
        let result: Result<serde_json::Value> = self
            .auth
            .with_token(|token| {
                let url = url.clone();
                let body = &body;
                async move { client.patch_json(url, body, Some(&token)).await }
            })
            .await;

        match result {
            Ok(_) => {
                debug!("Updated document");
                Ok(())
            }
            Err(err) if is_not_found(&err) => Err(Error::RecordNotFound {
                id: reference.id.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip_all, fields(%reference))]
    async fn delete(&self, reference: &DocumentRef) -> Result<()> {
        let url = self
            .config
            .document_url(reference.collection.as_str(), reference.id.as_str())?;

        let client = &self.client;
        let result = self
            .auth
            .with_token(|token| {
                let url = url.clone();
                async move { client.delete(url, Some(&token)).await }
            })
            .await;

        match result {
            Err(err) if !is_not_found(&err) => Err(err),
            _ => {
                debug!("Deleted document");
                Ok(())
            }
        }
    }
}
