//! nudge-core - Core reminder types and backend traits.
//!
//! This crate defines the data model shared by every part of nudge: validated
//! identifiers, the document/field model spoken by the remote store, the
//! reminder [`Record`] and [`Profile`] models, the error taxonomy, and the
//! [`AuthProvider`], [`DocumentStore`] and [`BlobStore`] traits implemented by
//! the concrete backends.

pub mod credentials;
pub mod document;
pub mod error;
pub mod listeners;
pub mod model;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use document::{Document, DocumentRef, FieldValue, Fields, Filter, Timestamp};
pub use error::Error;
pub use listeners::{AuthListener, AuthState, ListenerRegistry, Registration};
pub use model::{Avatar, Profile, Record, RecordDraft};
pub use tokens::{AccessToken, RefreshToken, SessionToken};
pub use traits::{AuthProvider, Backend, BlobStore, DocumentStore};
pub use types::{BackendUrl, Collection, Email, RecordId, UserId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
