//! Bounded retry with exponential backoff for external calls.

use std::future::Future;
use std::time::Duration;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Runs `op` up to `attempts` times, doubling the delay between failures.
///
/// Port errors are opaque, so every failure is treated as retryable; the
/// attempt cap bounds the cost of a terminal one. Each failed attempt is
/// logged under `label`.
///
/// # Errors
///
/// Returns the last attempt's error once the cap is reached.
pub async fn with_backoff<T, F, Fut>(
    label: &str,
    attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, BoxedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BoxedError>>,
{
    debug_assert!(attempts > 0);
    let mut delay = base_delay;
    let mut last_err: Option<BoxedError> = None;
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!(%label, attempt, error = %err, "external call failed");
                last_err = Some(err);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| format!("{label}: no attempts were made").into()))
}
