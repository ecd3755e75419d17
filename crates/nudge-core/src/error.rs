//! Error types for nudge.
//!
//! This module provides a unified error type with explicit variants for
//! session, lookup, remote, validation and input failures.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The unified error type for nudge operations.
///
/// This error type covers all possible failure modes in the toolkit,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation requires a signed-in user and none is present.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A mutation targeted a record that does not exist remotely.
    #[error("record not found: {id}")]
    RecordNotFound { id: String },

    /// A blob referenced by URL does not exist.
    #[error("blob not found: {url}")]
    BlobNotFound { url: String },

    /// Network or service failure on a remote call.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(#[from] RemoteError),

    /// Client-side validation rejected the request before any remote call.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Authentication errors reported by the auth provider.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Input validation errors (malformed ids, emails, URLs, fields).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RemoteUnavailable(err) => err.is_retryable(),
            Error::Auth(AuthError::TooManyAttempts) => true,
            _ => false,
        }
    }

    pub(crate) fn field(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidInput(InvalidInputError::Field {
            name: name.to_string(),
            reason: reason.into(),
        })
    }
}

/// Remote-call failures.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The service answered with an unexpected status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backing storage failed (local filesystem backends).
    #[error("storage error: {message}")]
    Storage { message: String },

    /// The service answered with a body that could not be decoded.
    #[error("undecodable response: {message}")]
    Decode { message: String },
}

impl RemoteError {
    /// Returns true for transient failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Connection { .. } | RemoteError::Timeout { .. } => true,
            RemoteError::Http { status, .. } => *status >= 500 || *status == 429,
            RemoteError::Storage { .. } | RemoteError::Decode { .. } => false,
        }
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password for an existing account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account exists for the given email.
    #[error("no account for this email")]
    UserNotFound,

    /// An account already exists for the given email.
    #[error("email already in use")]
    EmailInUse,

    /// The password does not meet the provider's rules.
    #[error("weak password: {reason}")]
    WeakPassword { reason: String },

    /// The session token expired or was revoked.
    #[error("session expired")]
    SessionExpired,

    /// The signed-in user may not access the resource.
    #[error("permission denied")]
    PermissionDenied,

    /// The provider throttled the account.
    #[error("too many attempts, try again later")]
    TooManyAttempts,
}

/// Client-side validation failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The reminder time is not after the current device time.
    #[error("reminder time {reminder_time} is not in the future (now {now})")]
    ReminderInPast {
        reminder_time: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// The record label is empty or whitespace.
    #[error("label cannot be empty")]
    EmptyLabel,
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid record id format.
    #[error("invalid record id '{value}': {reason}")]
    RecordId { value: String, reason: String },

    /// Invalid user id format.
    #[error("invalid user id '{value}': {reason}")]
    UserId { value: String, reason: String },

    /// Invalid email address.
    #[error("invalid email '{value}': {reason}")]
    Email { value: String, reason: String },

    /// Invalid collection name.
    #[error("invalid collection '{value}': {reason}")]
    Collection { value: String, reason: String },

    /// Invalid backend URL.
    #[error("invalid backend URL '{value}': {reason}")]
    BackendUrl { value: String, reason: String },

    /// A document field is missing or has the wrong type.
    #[error("field '{name}': {reason}")]
    Field { name: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
