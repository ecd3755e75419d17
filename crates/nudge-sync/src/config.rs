//! Synchronization settings.

use std::time::Duration;

use nudge_core::Collection;

/// Default limit for a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by [`RecordStore`](crate::RecordStore) and
/// [`ProfileManager`](crate::ProfileManager).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Limit for each remote call; expiry is reported as a retryable
    /// `RemoteUnavailable` error.
    pub remote_timeout: Duration,
    /// Collection holding reminder records.
    pub records_collection: Collection,
    /// Collection holding profiles.
    pub profiles_collection: Collection,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            records_collection: Collection::reminders(),
            profiles_collection: Collection::profiles(),
        }
    }
}

impl SyncConfig {
    /// Replace the remote call timeout.
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }
}
