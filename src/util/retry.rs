use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::storage::error::{StorageError, StorageResult};

/// Retry a storage operation while it keeps failing transiently.
///
/// Only errors [`StorageError::is_transient`] classifies as transport-level
/// are retried; "not found", "forbidden" and configuration errors return
/// immediately. Backoff doubles per attempt starting at 100ms.
pub async fn retry_transient<F, Fut, T>(
    max_retries: usize,
    operation_name: &str,
    mut operation: F,
) -> StorageResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StorageResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_transient() || attempt == max_retries {
                    return Err(e);
                }

                warn!(
                    "Transient error in {} (attempt {}/{}): {}",
                    operation_name,
                    attempt + 1,
                    max_retries,
                    e
                );

                last_error = Some(e);

                let backoff_ms = 100 * (1u64 << attempt.min(10));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }

    // Unreachable in practice: the loop always returns before draining.
    Err(last_error.unwrap_or_else(|| StorageError::Config("retry loop underflow".to_string())))
}
