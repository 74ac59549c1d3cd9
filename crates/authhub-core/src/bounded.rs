//! Deadline wrapper for calls that leave the process (database, cache, OAuth HTTP).

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AppError;
use crate::result::AppResult;

/// Runs `fut` with a deadline. An elapsed deadline becomes
/// [`ErrorKind::Unavailable`](crate::error::ErrorKind::Unavailable) so the
/// caller can retry instead of hanging.
pub async fn bounded<T, F>(timeout: Duration, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = timeout.as_millis() as u64, "Operation timed out");
            Err(AppError::unavailable(format!("{operation} timed out")))
        }
    }
}
