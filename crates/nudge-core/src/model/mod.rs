//! Reminder and profile models.
//!
//! These types are the boundary between the typed document representation
//! and the values the application works with.

mod profile;
mod record;

pub use profile::{Avatar, Profile};
pub use record::{Record, RecordDraft, format_display_timestamp};
