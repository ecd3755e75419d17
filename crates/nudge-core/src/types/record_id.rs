//! Record id type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::check_key;
use crate::error::{Error, InvalidInputError};

/// Length of generated record ids.
const GENERATED_LEN: usize = 20;

/// A validated document key.
///
/// Record ids identify individual documents within a collection. They are
/// opaque to users; the human-readable reminder text lives in the record's
/// display fields instead.
///
/// # Example
///
/// ```
/// use nudge_core::RecordId;
///
/// let id = RecordId::new("k3b9x0q2mfz7w1c4d8ea").unwrap();
/// assert_eq!(id.as_str(), "k3b9x0q2mfz7w1c4d8ea");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(pub(crate) String);

impl RecordId {
    /// Create a new record id from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, too long, or contains
    /// characters outside `A-Z a-z 0-9 _ -`.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if let Some(reason) = check_key(&s) {
            return Err(InvalidInputError::RecordId { value: s, reason }.into());
        }
        Ok(Self(s))
    }

    /// Allocate a fresh random id.
    pub fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(GENERATED_LEN);
        Self(id)
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_eq!(a.as_str().len(), GENERATED_LEN);
        assert!(RecordId::new(a.as_str()).is_ok());
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_empty() {
        assert!(RecordId::new("").is_err());
    }

    #[test]
    fn invalid_path_separator() {
        assert!(RecordId::new("reminders/abc").is_err());
    }

    #[test]
    fn invalid_dot_segments() {
        assert!(RecordId::new("..").is_err());
    }

    #[test]
    fn deserialize_rejects_invalid() {
        let result: Result<RecordId, _> = serde_json::from_str("\"a b\"");
        assert!(result.is_err());
    }
}
