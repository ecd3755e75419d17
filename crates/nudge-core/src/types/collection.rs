//! Collection name type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::check_key;
use crate::error::{Error, InvalidInputError};

/// A validated document collection name, such as `reminders`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Collection(String);

impl Collection {
    /// Create a new collection name, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid key.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if let Some(reason) = check_key(&s) {
            return Err(InvalidInputError::Collection { value: s, reason }.into());
        }
        Ok(Self(s))
    }

    /// The collection holding reminder records.
    pub fn reminders() -> Self {
        Self("reminders".to_string())
    }

    /// The collection holding user profiles.
    pub fn profiles() -> Self {
        Self("profiles".to_string())
    }

    /// Returns the collection name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Collection {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Collection> for String {
    fn from(collection: Collection) -> Self {
        collection.0
    }
}
