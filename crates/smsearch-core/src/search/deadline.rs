//! Per-call deadlines for store and embedder calls.

use super::types::SearchError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Awaits `fut`, failing with [`SearchError::Timeout`] if `deadline` elapses
/// first. `None` waits indefinitely.
///
/// The inner error type is converted into `SearchError`, so store and
/// embedding futures can be passed in directly.
pub async fn with_deadline<T, E, F>(
    operation: &'static str,
    deadline: Option<Duration>,
    fut: F,
) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, E>>,
    SearchError: From<E>,
{
    match deadline {
        None => fut.await.map_err(SearchError::from),
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(result) => result.map_err(SearchError::from),
            Err(_) => {
                warn!("{} timed out after {:?}", operation, after);
                Err(SearchError::Timeout { operation, after })
            }
        },
    }
}
