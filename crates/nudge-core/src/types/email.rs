//! Email address type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A syntactically plausible, normalized email address.
///
/// Addresses are trimmed and lowercased so that lookups by email behave the
/// way the hosted auth provider does. Deliverability is not checked.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create a new email from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty or not of the form
    /// `local@domain.tld`.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let normalized = s.as_ref().trim().to_lowercase();
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    /// Returns the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::Email {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if s.is_empty() {
            return Err(invalid("cannot be empty"));
        }

        if s.chars().any(char::is_whitespace) {
            return Err(invalid("cannot contain whitespace"));
        }

        let (local, domain) = s.split_once('@').ok_or_else(|| invalid("missing '@'"))?;

        if local.is_empty() {
            return Err(invalid("missing local part"));
        }

        if domain.contains('@') {
            return Err(invalid("contains more than one '@'"));
        }

        let labels_ok = domain.split('.').all(|label| !label.is_empty());
        if !domain.contains('.') || !labels_ok {
            return Err(invalid("domain must look like 'example.com'"));
        }

        Ok(())
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
