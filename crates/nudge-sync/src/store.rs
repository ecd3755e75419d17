//! The synchronized record list.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use nudge_core::{
    AuthState, Document, DocumentRef, DocumentStore, Error, Filter, Record, RecordDraft, RecordId,
    Result, UserId,
};

use crate::config::SyncConfig;
use crate::remote::with_timeout;
use crate::session::AuthSession;

/// Where the record list stands for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPhase {
    /// No user, or the user's records have not loaded yet.
    #[default]
    Empty,
    /// A reload is in flight; the previous list stays visible.
    Loading,
    /// The list reflects the last successful reload or mutation.
    Loaded,
}

/// Published sync status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// Message of the most recent failed reload, cleared by the next success.
    pub last_error: Option<String>,
}

/// What happened to a reload's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The list was replaced with this many records.
    Applied(usize),
    /// A newer reload or a session change superseded this one.
    Discarded,
}

#[derive(Debug, Default)]
struct StoreState {
    user: Option<UserId>,
    /// Bumped on every sign-in and sign-out.
    epoch: u64,
    /// Bumped on every reload and session change. Only the newest reload applies.
    generation: u64,
    /// Phase to return to when a reload fails.
    settled: SyncPhase,
}

/// Session snapshot taken before a mutation's remote call.
struct Ticket {
    user: UserId,
    epoch: u64,
}

struct StoreInner {
    documents: Arc<dyn DocumentStore>,
    config: SyncConfig,
    state: Mutex<StoreState>,
    records: watch::Sender<Arc<[Record]>>,
    selection: watch::Sender<Option<Record>>,
    status: watch::Sender<SyncStatus>,
}

/// Authoritative local copy of the signed-in user's records.
///
/// All mutations go through this type; consumers read published snapshots.
/// State is only touched under a mutex that is never held across a remote
/// call, and reload responses are tagged with a generation so that a stale
/// response (superseded by a newer reload or a session change) is dropped
/// instead of applied.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<StoreInner>,
}

impl RecordStore {
    /// Create an empty store backed by `documents`.
    pub fn new(documents: Arc<dyn DocumentStore>, config: SyncConfig) -> Self {
        let (records, _) = watch::channel(Vec::new().into());
        let (selection, _) = watch::channel(None);
        let (status, _) = watch::channel(SyncStatus::default());

        Self {
            inner: Arc::new(StoreInner {
                documents,
                config,
                state: Mutex::new(StoreState::default()),
                records,
                selection,
                status,
            }),
        }
    }

    // ========================================================================
    // Published state
    // ========================================================================

    /// Snapshot of the current list.
    pub fn records(&self) -> Arc<[Record]> {
        self.inner.records.borrow().clone()
    }

    /// Subscribe to list changes.
    pub fn subscribe_records(&self) -> watch::Receiver<Arc<[Record]>> {
        self.inner.records.subscribe()
    }

    /// The record currently being edited.
    pub fn selection(&self) -> Option<Record> {
        self.inner.selection.borrow().clone()
    }

    /// Subscribe to selection changes.
    pub fn subscribe_selection(&self) -> watch::Receiver<Option<Record>> {
        self.inner.selection.subscribe()
    }

    /// Current sync status.
    pub fn status(&self) -> SyncStatus {
        self.inner.status.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status.subscribe()
    }

    /// Wait until no reload is in flight and return the status.
    pub async fn settled(&self) -> SyncStatus {
        let mut rx = self.subscribe_status();
        match rx.wait_for(|status| status.phase != SyncPhase::Loading).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    /// The user whose records are held.
    pub fn current_user(&self) -> Option<UserId> {
        self.lock().user.clone()
    }

    /// Records whose label contains `query`, ignoring case.
    ///
    /// Pure and local: filters the current snapshot without contacting the
    /// store. An empty query returns the whole list.
    pub fn filter(&self, query: &str) -> Vec<Record> {
        let snapshot = self.records();
        crate::filter_records(&snapshot, query).cloned().collect()
    }

    // ========================================================================
    // Session transitions
    // ========================================================================

    /// Switch to `user`: clear the list, enter Loading, and return the reload
    /// for that user.
    ///
    /// The transition happens immediately; the returned future performs the
    /// remote query and can be spawned.
    pub fn on_sign_in(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<ReloadOutcome>> + Send + 'static {
        let generation = {
            let mut state = self.lock();
            state.user = Some(user.clone());
            state.epoch += 1;
            state.generation += 1;
            state.settled = SyncPhase::Empty;

            self.inner.records.send_replace(Vec::new().into());
            self.inner.selection.send_replace(None);
            self.inner.status.send_replace(SyncStatus {
                phase: SyncPhase::Loading,
                last_error: None,
            });

            state.generation
        };

        info!(%user, "Loading records for signed-in user");

        let store = self.clone();
        async move { store.fetch_and_apply(user, generation).await }
    }

    /// Forget the user: clear the list and selection, and make any in-flight
    /// reload or mutation for them a no-op on arrival.
    pub fn on_sign_out(&self) {
        let mut state = self.lock();
        state.user = None;
        state.epoch += 1;
        state.generation += 1;
        state.settled = SyncPhase::Empty;

        self.inner.records.send_replace(Vec::new().into());
        self.inner.selection.send_replace(None);
        self.inner.status.send_replace(SyncStatus::default());

        info!("Cleared records after sign-out");
    }

    /// Follow `session`, reloading on sign-in and clearing on sign-out.
    ///
    /// The current state is applied immediately. Following stops when the
    /// handle is dropped or the session goes away.
    pub fn follow(&self, session: &AuthSession) -> FollowHandle {
        let mut rx = session.subscribe();
        let store = self.clone();

        let task = tokio::spawn(async move {
            loop {
                let state = rx.borrow_and_update().clone();
                store.apply_auth_state(state);

                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        FollowHandle { task }
    }

    fn apply_auth_state(&self, state: AuthState) {
        let held = self.current_user();

        match state {
            Some(user) if held.as_ref() == Some(&user) => {}
            Some(user) => {
                let reload = self.on_sign_in(user);
                tokio::spawn(async move {
                    if let Err(err) = reload.await {
                        warn!(error = %err, "Reload after sign-in failed");
                    }
                });
            }
            None if held.is_some() => self.on_sign_out(),
            None => {}
        }
    }

    // ========================================================================
    // Remote operations
    // ========================================================================

    /// Replace the list with the signed-in user's records from the store.
    ///
    /// On failure the previous list stays visible and the error is both
    /// returned and published in [`SyncStatus::last_error`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] when nobody is signed in, or the
    /// remote failure.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<ReloadOutcome> {
        let (user, generation) = {
            let mut state = self.lock();
            let user = state.user.clone().ok_or(Error::NotAuthenticated)?;
            state.generation += 1;
            self.inner
                .status
                .send_modify(|status| status.phase = SyncPhase::Loading);
            (user, state.generation)
        };

        self.fetch_and_apply(user, generation).await
    }

    async fn fetch_and_apply(&self, user: UserId, generation: u64) -> Result<ReloadOutcome> {
        let config = &self.inner.config;
        let filter = Filter::eq(Record::OWNER_FIELD, user.as_str());

        debug!(%user, generation, "Querying records");
        let result = with_timeout(
            config.remote_timeout,
            "query",
            self.inner.documents.query(&config.records_collection, &filter),
        )
        .await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(%user, generation, "Discarding superseded reload");
            return Ok(ReloadOutcome::Discarded);
        }

        match result {
            Ok(documents) => {
                let records = collect_records(documents, &user);
                let count = records.len();
                state.settled = SyncPhase::Loaded;
                self.publish(records);
                self.inner.status.send_replace(SyncStatus {
                    phase: SyncPhase::Loaded,
                    last_error: None,
                });
                debug!(%user, count, "Applied reload");
                Ok(ReloadOutcome::Applied(count))
            }
            Err(err) => {
                warn!(%user, error = %err, "Reload failed; keeping previous list");
                self.inner.status.send_replace(SyncStatus {
                    phase: state.settled,
                    last_error: Some(err.to_string()),
                });
                Err(err)
            }
        }
    }

    /// Create a record for the signed-in user, then reload.
    ///
    /// Returns the new record's id. The write counts as done once the store
    /// accepts it; a failure of the follow-up reload is published in the
    /// status rather than returned.
    ///
    /// # Errors
    ///
    /// [`Error::NotAuthenticated`] without a user, [`Error::Validation`] for
    /// a blank label or a reminder time in the past (checked before any
    /// remote call), or the remote failure.
    #[instrument(skip(self, draft), fields(label = %draft.label))]
    pub async fn create(&self, draft: RecordDraft) -> Result<RecordId> {
        let ticket = self.ticket()?;
        draft.validate(Utc::now())?;

        let id = RecordId::generate();
        let record = draft.into_record(id.clone(), ticket.user.clone());

        debug!(%id, user = %ticket.user, "Creating record");
        with_timeout(
            self.inner.config.remote_timeout,
            "write",
            self.inner.documents.write(
                &self.inner.config.records_collection,
                &id,
                &record.to_fields(),
            ),
        )
        .await?;

        self.reload_after_mutation(&ticket).await;
        Ok(id)
    }

    /// Replace the label, display text and reminder time of a record, then
    /// reload. The owner never changes.
    ///
    /// # Errors
    ///
    /// [`Error::RecordNotFound`] when no document with `id` exists for the
    /// signed-in user, plus the errors of [`create`](Self::create).
    #[instrument(skip_all, fields(%id))]
    pub async fn update(&self, id: &RecordId, draft: RecordDraft) -> Result<()> {
        let ticket = self.ticket()?;
        draft.validate(Utc::now())?;

        let reference = self.reference(id);
        let existing = self.lookup(&reference).await?;
        if !owned_by(existing.as_ref(), &ticket.user) {
            return Err(Error::RecordNotFound { id: id.to_string() });
        }

        debug!(user = %ticket.user, "Updating record");
        with_timeout(
            self.inner.config.remote_timeout,
            "update",
            self.inner
                .documents
                .update(&reference, &draft.to_update_fields()),
        )
        .await?;

        self.reload_after_mutation(&ticket).await;
        Ok(())
    }

    /// Delete a record and drop it from the local list.
    ///
    /// Deleting a record that does not exist (or belongs to someone else)
    /// makes no remote call, so repeating a delete is harmless. Any local
    /// entry with that id is dropped either way.
    ///
    /// # Errors
    ///
    /// [`Error::NotAuthenticated`] without a user, or the remote failure.
    #[instrument(skip_all, fields(%id))]
    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let ticket = self.ticket()?;

        let reference = self.reference(id);
        let existing = self.lookup(&reference).await?;
        if !owned_by(existing.as_ref(), &ticket.user) {
            debug!("No matching record; nothing to delete");
            self.drop_local(&ticket, id);
            return Ok(());
        }

        with_timeout(
            self.inner.config.remote_timeout,
            "delete",
            self.inner.documents.delete(&reference),
        )
        .await?;

        if self.drop_local(&ticket, id) {
            debug!("Deleted record");
        }
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Mark `record` as the one being edited.
    pub fn select_for_edit(&self, record: Record) {
        debug!(id = %record.id, "Selected record for edit");
        self.inner.selection.send_replace(Some(record));
    }

    /// Clear the editing slot.
    pub fn clear_selection(&self) {
        self.inner.selection.send_replace(None);
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ticket(&self) -> Result<Ticket> {
        let state = self.lock();
        let user = state.user.clone().ok_or(Error::NotAuthenticated)?;
        Ok(Ticket {
            user,
            epoch: state.epoch,
        })
    }

    fn reference(&self, id: &RecordId) -> DocumentRef {
        DocumentRef::new(self.inner.config.records_collection.clone(), id.clone())
    }

    async fn lookup(&self, reference: &DocumentRef) -> Result<Option<Document>> {
        with_timeout(
            self.inner.config.remote_timeout,
            "get",
            self.inner.documents.get(reference),
        )
        .await
    }

    async fn reload_after_mutation(&self, ticket: &Ticket) {
        if self.lock().epoch != ticket.epoch {
            debug!("Session changed during mutation; skipping reload");
            return;
        }

        if let Err(err) = self.reload().await {
            warn!(error = %err, "Reload after mutation failed");
        }
    }

    /// Remove `id` from the list and the selection unless the session
    /// changed since `ticket` was taken. Returns false when it did.
    fn drop_local(&self, ticket: &Ticket, id: &RecordId) -> bool {
        let state = self.lock();
        if state.epoch != ticket.epoch {
            debug!("Session changed during delete; leaving list alone");
            return false;
        }

        self.inner.records.send_if_modified(|records| {
            match records.iter().position(|record| &record.id == id) {
                Some(index) => {
                    let mut remaining = records.to_vec();
                    remaining.remove(index);
                    *records = remaining.into();
                    true
                }
                None => false,
            }
        });
        self.inner.selection.send_if_modified(|selection| {
            if selection.as_ref().is_some_and(|record| &record.id == id) {
                *selection = None;
                true
            } else {
                false
            }
        });
        true
    }

    /// Replace the list and bring the selection in line with it.
    fn publish(&self, records: Vec<Record>) {
        self.inner.selection.send_if_modified(|selection| {
            let fresh = match selection.as_ref() {
                None => return false,
                Some(current) => records.iter().find(|r| r.id == current.id).cloned(),
            };
            if *selection == fresh {
                return false;
            }
            *selection = fresh;
            true
        });
        self.inner.records.send_replace(records.into());
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("user", &self.current_user())
            .field("records", &self.inner.records.borrow().len())
            .field("status", &self.status())
            .finish()
    }
}

/// Stops following an [`AuthSession`] when dropped.
#[derive(Debug)]
pub struct FollowHandle {
    task: JoinHandle<()>,
}

impl Drop for FollowHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn owned_by(document: Option<&Document>, user: &UserId) -> bool {
    document
        .and_then(|doc| doc.fields.get_str(Record::OWNER_FIELD).ok())
        .is_some_and(|owner| owner == user.as_str())
}

/// Decode, de-duplicate and order a reload's documents.
fn collect_records(documents: Vec<Document>, user: &UserId) -> Vec<Record> {
    let mut seen = HashSet::new();
    let mut records: Vec<Record> = documents
        .iter()
        .filter_map(|document| match Record::from_document(document) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(reference = %document.reference, error = %err, "Skipping malformed record");
                None
            }
        })
        .filter(|record| &record.owner_id == user)
        .filter(|record| {
            let fresh = seen.insert(record.id.clone());
            if !fresh {
                warn!(id = %record.id, "Skipping duplicate record id");
            }
            fresh
        })
        .collect();

    records.sort_by(|a, b| {
        a.reminder_time
            .cmp(&b.reminder_time)
            .then_with(|| a.id.cmp(&b.id))
    });
    records
}
