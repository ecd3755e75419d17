//! User id type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::check_key;
use crate::error::{Error, InvalidInputError};
use crate::types::RecordId;

/// A validated user identity as issued by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new user id from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid key.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if let Some(reason) = check_key(&s) {
            return Err(InvalidInputError::UserId { value: s, reason }.into());
        }
        Ok(Self(s))
    }

    /// Returns the user id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The document key for per-user documents such as profiles.
    pub fn document_id(&self) -> RecordId {
        // Both types share one alphabet.
        RecordId(self.0.clone())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
