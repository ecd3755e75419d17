//! Time-limited remote calls.

use std::future::Future;
use std::time::Duration;

use nudge_core::Result;
use nudge_core::error::RemoteError;
use tracing::warn;

/// Run a remote call, failing with a retryable timeout after `limit`.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            let duration_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!(operation, duration_ms, "Remote call timed out");
            Err(RemoteError::Timeout { duration_ms }.into())
        }
    }
}
