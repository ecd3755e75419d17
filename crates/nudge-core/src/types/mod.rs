//! Validated identifier types.
//!
//! These types enforce their format at construction time, so ids that
//! reach the backends are always safe to use as path segments and keys.

mod backend_url;
mod collection;
mod email;
mod record_id;
mod user_id;

pub use backend_url::{BackendKind, BackendUrl};
pub use collection::Collection;
pub use email::Email;
pub use record_id::RecordId;
pub use user_id::UserId;

/// Maximum length of ids and collection names.
pub(crate) const MAX_KEY_LEN: usize = 128;

/// Checks the shared key alphabet: `A-Z a-z 0-9 _ -`, 1 to 128 characters.
///
/// Returns the reason the key is rejected.
pub(crate) fn check_key(s: &str) -> Option<String> {
    if s.is_empty() {
        return Some("cannot be empty".to_string());
    }

    if s.len() > MAX_KEY_LEN {
        return Some(format!(
            "exceeds maximum length of {} characters",
            MAX_KEY_LEN
        ));
    }

    s.chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
        .map(|c| format!("contains invalid character '{}'", c))
}
