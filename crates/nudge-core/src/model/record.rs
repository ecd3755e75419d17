//! Reminder record model.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::document::{Document, Fields, Timestamp};
use crate::error::{Error, ValidationError};
use crate::types::{RecordId, UserId};

const LABEL: &str = "label";
const DISPLAY_TIMESTAMP: &str = "displayTimestamp";
const OWNER_ID: &str = "ownerId";
const REMINDER_TIME: &str = "reminderTime";

/// Render a reminder time the way it is shown to users,
/// e.g. `Oct 16, 2026 at 9:30 AM`.
pub fn format_display_timestamp(time: &DateTime<Local>) -> String {
    time.format("%b %-d, %Y at %-I:%M %p").to_string()
}

/// A reminder owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Server-side document key.
    pub id: RecordId,
    /// User-entered text; also the search target.
    pub label: String,
    /// Pre-formatted reminder time for display.
    pub display_timestamp: String,
    /// The user who owns this record.
    pub owner_id: UserId,
    /// When the reminder is due, in device-local time.
    pub reminder_time: DateTime<Local>,
}

impl Record {
    /// The field holding the owner, used to scope queries.
    pub const OWNER_FIELD: &'static str = OWNER_ID;

    /// Decode a record from a stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is missing or mistyped.
    pub fn from_document(document: &Document) -> Result<Self> {
        let fields = &document.fields;
        Ok(Self {
            id: document.reference.id.clone(),
            label: fields.get_str(LABEL)?.to_string(),
            display_timestamp: fields.get_str(DISPLAY_TIMESTAMP)?.to_string(),
            owner_id: UserId::new(fields.get_str(OWNER_ID)?)?,
            reminder_time: fields.get_timestamp(REMINDER_TIME)?.to_local(),
        })
    }

    /// Encode every field for a full write.
    pub fn to_fields(&self) -> Fields {
        Fields::new()
            .with(LABEL, self.label.as_str())
            .with(DISPLAY_TIMESTAMP, self.display_timestamp.as_str())
            .with(OWNER_ID, self.owner_id.as_str())
            .with(REMINDER_TIME, Timestamp::from_local(self.reminder_time))
    }

    /// Case-insensitive substring match on the label.
    ///
    /// `needle` must already be lowercase.
    pub fn label_contains(&self, needle: &str) -> bool {
        needle.is_empty() || self.label.to_lowercase().contains(needle)
    }
}

/// The user-editable part of a record, used for create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub label: String,
    pub display_timestamp: String,
    pub reminder_time: DateTime<Local>,
}

impl RecordDraft {
    /// Create a draft whose display text is derived from the reminder time.
    pub fn new(label: impl Into<String>, reminder_time: DateTime<Local>) -> Self {
        Self {
            label: label.into(),
            display_timestamp: format_display_timestamp(&reminder_time),
            reminder_time,
        }
    }

    /// Override the display text.
    pub fn with_display_timestamp(mut self, display_timestamp: impl Into<String>) -> Self {
        self.display_timestamp = display_timestamp.into();
        self
    }

    /// Check the draft against the device clock.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyLabel`] for a blank label and
    /// [`ValidationError::ReminderInPast`] when the reminder time is before `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel.into());
        }

        let reminder_time = self.reminder_time.with_timezone(&Utc);
        if reminder_time < now {
            return Err(Error::Validation(ValidationError::ReminderInPast {
                reminder_time,
                now,
            }));
        }

        Ok(())
    }

    /// Build the full record for a new document.
    pub fn into_record(self, id: RecordId, owner_id: UserId) -> Record {
        Record {
            id,
            label: self.label,
            display_timestamp: self.display_timestamp,
            owner_id,
            reminder_time: self.reminder_time,
        }
    }

    /// The fields an update replaces. The owner is never among them.
    pub fn to_update_fields(&self) -> Fields {
        Fields::new()
            .with(LABEL, self.label.as_str())
            .with(DISPLAY_TIMESTAMP, self.display_timestamp.as_str())
            .with(REMINDER_TIME, Timestamp::from_local(self.reminder_time))
    }
}
