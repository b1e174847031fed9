//! Retry with exponential back-off and jitter for business search requests.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is
//! returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::YelpError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection refused/reset.
/// - [`YelpError::RateLimited`]: HTTP 429.
/// - HTTP 5xx responses.
///
/// **Not retriable:** decode failures, auth failures, other 4xx, invalid
/// configuration, and the aggregate errors produced above the page level.
pub(crate) fn is_retriable(err: &YelpError) -> bool {
    match err {
        YelpError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.is_request()
                || e.status().is_some_and(|s| s.is_server_error())
        }
        YelpError::RateLimited { .. } => true,
        YelpError::UnexpectedStatus { status, .. } => *status >= 500,
        YelpError::Deserialize { .. }
        | YelpError::Unauthorized { .. }
        | YelpError::PageTimeout { .. }
        | YelpError::AllPagesFailed { .. }
        | YelpError::InvalidBaseUrl { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
///
/// `backoff_base_ms × 2^(attempt-1)`, raised to the server's `Retry-After`
/// for 429s, capped at 30 s.
fn base_delay_ms(attempt: u32, backoff_base_ms: u64, err: &YelpError) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
    let floor = match err {
        YelpError::RateLimited { retry_after_secs } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    computed.max(floor).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Each sleep is the base delay ± 25 % jitter. Non-retriable errors are
/// returned immediately; once retries are exhausted the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, YelpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, YelpError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_delay_ms(attempt, backoff_base_ms, &err);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient business search error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
