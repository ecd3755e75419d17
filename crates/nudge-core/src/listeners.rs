//! Auth-state listener registry.
//!
//! Auth providers deliver sign-in state changes to any number of observers.
//! Each observer holds an [`AuthListener`]; the registration it carries is
//! removed from the provider exactly once, when the [`Registration`] guard is
//! dropped.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::mpsc;
use tracing::trace;

use crate::types::UserId;

/// The observable auth state: the signed-in user, or `None`.
pub type AuthState = Option<UserId>;

type Listeners = Mutex<RegistryInner>;

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    listeners: HashMap<u64, mpsc::UnboundedSender<AuthState>>,
}

/// Fan-out of auth state changes to registered listeners.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Listeners>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. The current state is delivered first.
    pub fn register(&self, current: AuthState) -> AuthListener {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // A fresh receiver is still open.
        let _ = tx.send(current);

        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.insert(id, tx);
            id
        };

        trace!(listener = id, "Registered auth listener");

        let events = async_stream::stream! {
            while let Some(state) = rx.recv().await {
                yield state;
            }
        };

        AuthListener {
            registration: Registration {
                id,
                registry: Arc::downgrade(&self.inner),
            },
            events: Box::pin(events),
        }
    }

    /// Deliver a state change to every live listener.
    pub fn notify(&self, state: &AuthState) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .listeners
            .retain(|_, tx| tx.send(state.clone()).is_ok());
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    /// Returns true if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Guard for one listener registration; dropping it deregisters.
#[derive(Debug)]
pub struct Registration {
    id: u64,
    registry: Weak<Listeners>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&self.id);
            trace!(listener = self.id, "Removed auth listener");
        }
    }
}

/// A stream of auth state changes for one observer.
///
/// The stream ends once the registration is dropped.
pub struct AuthListener {
    registration: Registration,
    events: Pin<Box<dyn Stream<Item = AuthState> + Send>>,
}

impl AuthListener {
    /// Separate the registration guard from the event stream, so the owner
    /// can control deregistration while a task consumes the events.
    pub fn into_parts(
        self,
    ) -> (
        Registration,
        Pin<Box<dyn Stream<Item = AuthState> + Send>>,
    ) {
        (self.registration, self.events)
    }
}

impl Stream for AuthListener {
    type Item = AuthState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for AuthListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthListener")
            .field("registration", &self.registration)
            .finish_non_exhaustive()
    }
}
