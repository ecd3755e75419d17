//! nudge-sync - Keeps a user's reminders in step with the remote store.
//!
//! [`AuthSession`] observes the auth provider and publishes who is signed in.
//! [`RecordStore`] owns the in-memory list of that user's records: it reloads
//! on sign-in, clears on sign-out, and reconciles local state after every
//! create, update and delete. [`ProfileManager`] applies the same pattern to
//! the user's profile document and avatar.
//!
//! # Example
//!
//! ```no_run
//! use nudge_core::{Backend, RecordDraft};
//! use nudge_sync::{AuthSession, RecordStore, SyncConfig};
//!
//! # async fn example(backend: Backend) -> nudge_core::Result<()> {
//! let session = AuthSession::observe(backend.auth.as_ref());
//! let store = RecordStore::new(backend.documents.clone(), SyncConfig::default());
//! let _follow = store.follow(&session);
//!
//! let at = chrono::Local::now() + chrono::Duration::hours(1);
//! store.create(RecordDraft::new("Walk", at)).await?;
//!
//! for record in store.filter("walk") {
//!     println!("{}: {}", record.display_timestamp, record.label);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod filter;
mod profile;
mod remote;
mod session;
mod store;

pub use config::SyncConfig;
pub use filter::{Filtered, filter_records};
pub use profile::ProfileManager;
pub use session::AuthSession;
pub use store::{FollowHandle, RecordStore, ReloadOutcome, SyncPhase, SyncStatus};
