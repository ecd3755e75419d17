//! Sign-in credentials type.

use std::fmt;

use crate::types::Email;

/// Email and password credentials for the auth provider.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use nudge_core::{Credentials, Email};
///
/// let email = Email::new("alice@example.com").unwrap();
/// let creds = Credentials::new(email, "hunter22");
/// assert_eq!(creds.email().as_str(), "alice@example.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: Email,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(email: Email, password: impl Into<String>) -> Self {
        Self {
            email,
            password: password.into(),
        }
    }

    /// Returns the email address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
