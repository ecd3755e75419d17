//! In-memory backend for sync tests.
//!
//! Each collaborator counts its calls and can be told to fail. The document
//! store can also hold the next query open until the test releases it, which
//! is how the stale-reload races are reproduced.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::sync::oneshot;

use nudge_core::error::{AuthError, RemoteError};
use nudge_core::{
    AccessToken, AuthListener, AuthProvider, AuthState, BlobStore, Collection, Credentials,
    Document, DocumentRef, DocumentStore, Email, Error, Fields, Filter, ListenerRegistry, Record,
    RecordDraft, RecordId, Result, SessionToken, UserId,
};

pub fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

pub fn rid(s: &str) -> RecordId {
    RecordId::new(s).unwrap()
}

/// A local time `hours` from now.
pub fn in_hours(hours: i64) -> DateTime<Local> {
    Local::now() + chrono::Duration::hours(hours)
}

fn unavailable() -> Error {
    RemoteError::Connection {
        message: "backend offline".to_string(),
    }
    .into()
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Default)]
pub struct MemoryAuth {
    registry: ListenerRegistry,
    user: Mutex<AuthState>,
    accounts: Mutex<HashMap<Email, (UserId, String)>>,
}

impl MemoryAuth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Switch the signed-in user and announce it.
    pub fn set_user(&self, state: AuthState) {
        *self.user.lock().unwrap() = state.clone();
        self.registry.notify(&state);
    }

    /// Announce a state without changing anything.
    pub fn announce(&self, state: AuthState) {
        self.registry.notify(&state);
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    fn observe_state(&self) -> AuthListener {
        self.registry.register(self.current_user())
    }

    fn current_user(&self) -> Option<UserId> {
        self.user.lock().unwrap().clone()
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<UserId> {
        let user = {
            let accounts = self.accounts.lock().unwrap();
            let (user, password) = accounts
                .get(credentials.email())
                .ok_or(AuthError::UserNotFound)?;
            if password != credentials.password() {
                return Err(AuthError::InvalidCredentials.into());
            }
            user.clone()
        };
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<UserId> {
        let user = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(credentials.email()) {
                return Err(AuthError::EmailInUse.into());
            }
            let user = uid(&format!("user{}", accounts.len() + 1));
            accounts.insert(
                credentials.email().clone(),
                (user.clone(), credentials.password().to_string()),
            );
            user
        };
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.set_user(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &Email) -> Result<()> {
        if self.accounts.lock().unwrap().contains_key(email) {
            Ok(())
        } else {
            Err(AuthError::UserNotFound.into())
        }
    }

    fn session_token(&self) -> Option<SessionToken> {
        self.current_user().map(|user_id| SessionToken {
            user_id,
            access_token: AccessToken::new("memory"),
            refresh_token: None,
        })
    }

    async fn restore(&self, token: SessionToken) -> Result<UserId> {
        self.set_user(Some(token.user_id.clone()));
        Ok(token.user_id)
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct Calls {
    pub query: AtomicUsize,
    pub get: AtomicUsize,
    pub write: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        [
            &self.query,
            &self.get,
            &self.write,
            &self.update,
            &self.delete,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }
}

/// Test side of a held query.
pub struct QueryGate {
    entered: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl QueryGate {
    /// Wait until the held query has started.
    pub async fn entered(&mut self) {
        (&mut self.entered).await.unwrap();
    }

    /// Let the held query read the store and return.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

struct HeldQuery {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

#[derive(Default)]
pub struct MemoryDocuments {
    documents: Mutex<HashMap<DocumentRef, Fields>>,
    held: Mutex<Option<HeldQuery>>,
    delay: Mutex<Option<Duration>>,
    failing: AtomicBool,
    failing_queries: AtomicBool,
    pub calls: Calls,
}

impl MemoryDocuments {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold the next query open until the returned gate is released.
    pub fn hold_next_query(&self) -> QueryGate {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.held.lock().unwrap() = Some(HeldQuery {
            entered: entered_tx,
            release: release_rx,
        });
        QueryGate {
            entered: entered_rx,
            release: release_tx,
        }
    }

    /// Make every call sleep before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Fail every call.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fail only queries.
    pub fn set_failing_queries(&self, failing: bool) {
        self.failing_queries.store(failing, Ordering::SeqCst);
    }

    /// Store fields directly, bypassing all checks.
    pub fn insert_raw(&self, collection: &Collection, id: &str, fields: Fields) {
        let reference = DocumentRef::new(collection.clone(), rid(id));
        self.documents.lock().unwrap().insert(reference, fields);
    }

    /// Store a well-formed reminder.
    pub fn insert_record(&self, id: &str, owner: &str, label: &str, at: DateTime<Local>) {
        let record = RecordDraft::new(label, at).into_record(rid(id), uid(owner));
        self.insert_raw(&Collection::reminders(), id, record.to_fields());
    }

    pub fn fields(&self, collection: &Collection, id: &str) -> Option<Fields> {
        let reference = DocumentRef::new(collection.clone(), rid(id));
        self.documents.lock().unwrap().get(&reference).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    async fn pause(&self) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn query(&self, collection: &Collection, filter: &Filter) -> Result<Vec<Document>> {
        self.calls.query.fetch_add(1, Ordering::SeqCst);

        let held = self.held.lock().unwrap().take();
        if let Some(held) = held {
            let _ = held.entered.send(());
            let _ = held.release.await;
        }

        self.pause().await?;
        if self.failing_queries.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let documents = self.documents.lock().unwrap();
        Ok(documents
            .iter()
            .filter(|(reference, fields)| {
                &reference.collection == collection && filter.matches(fields)
            })
            .map(|(reference, fields)| Document {
                reference: reference.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn get(&self, reference: &DocumentRef) -> Result<Option<Document>> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.pause().await?;

        Ok(self
            .documents
            .lock()
            .unwrap()
            .get(reference)
            .map(|fields| Document {
                reference: reference.clone(),
                fields: fields.clone(),
            }))
    }

    async fn write(&self, collection: &Collection, id: &RecordId, fields: &Fields) -> Result<()> {
        self.calls.write.fetch_add(1, Ordering::SeqCst);
        self.pause().await?;

        let reference = DocumentRef::new(collection.clone(), id.clone());
        self.documents
            .lock()
            .unwrap()
            .insert(reference, fields.clone());
        Ok(())
    }

    async fn update(&self, reference: &DocumentRef, fields: &Fields) -> Result<()> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.pause().await?;

        let mut documents = self.documents.lock().unwrap();
        let existing = documents
            .get_mut(reference)
            .ok_or_else(|| Error::RecordNotFound {
                id: reference.id.to_string(),
            })?;
        existing.merge(fields);
        Ok(())
    }

    async fn delete(&self, reference: &DocumentRef) -> Result<()> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.pause().await?;

        self.documents.lock().unwrap().remove(reference);
        Ok(())
    }
}

// ============================================================================
// Blobs
// ============================================================================

#[derive(Default)]
pub struct MemoryBlobs {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    failing: AtomicBool,
    pub uploads: AtomicUsize,
}

impl MemoryBlobs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let url = format!("mem://{path}");
        self.blobs.lock().unwrap().insert(url.clone(), bytes);
        Ok(url)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        self.blobs
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::BlobNotFound {
                url: url.to_string(),
            })
    }
}

/// Labels of a record list, in order.
pub fn labels(records: &[Record]) -> Vec<&str> {
    records.iter().map(|record| record.label.as_str()).collect()
}
