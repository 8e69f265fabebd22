//! Request pacing and retry utilities for the page fetcher.
//!
//! Two cooperating pieces: [`RequestGate`] enforces a minimum wall-clock gap
//! between requests across the whole run, and [`retry_with_backoff`] retries
//! transient HTTP failures with exponential backoff. Non-retriable errors
//! (404, 4xx statuses, content-type mismatches) are propagated immediately.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ScrapeError;

/// Upper bound on a single backoff sleep, regardless of attempt count.
const MAX_BACKOFF_SECS: u64 = 60;

/// Global pacing state for outbound requests.
///
/// Holds the completion time of the most recent request; [`acquire`] sleeps
/// out whatever remains of the configured gap before the next request may
/// start. The gap is measured from request *completion* to next request
/// *start*, so it bounds the aggregate request rate no matter how long an
/// individual request takes.
///
/// The run loop is single-worker, so there is never lock contention today;
/// the interior mutex exists so that a future concurrent fetcher can share
/// one gate without any call-site changes.
///
/// [`acquire`]: RequestGate::acquire
#[derive(Debug)]
pub struct RequestGate {
    min_gap: Duration,
    last_completed: Mutex<Option<Instant>>,
}

impl RequestGate {
    #[must_use]
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_completed: Mutex::new(None),
        }
    }

    /// Waits until the configured gap since the last completed request has
    /// elapsed. Returns immediately on the first request of a run or when the
    /// gap is zero.
    pub async fn acquire(&self) {
        let last = *self.last_completed.lock().await;
        if let Some(completed_at) = last {
            let elapsed = completed_at.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap - elapsed).await;
            }
        }
    }

    /// Advances the watermark. Call once per request, after the response has
    /// been fully received (success or failure alike).
    pub async fn mark_complete(&self) {
        *self.last_completed.lock().await = Some(Instant::now());
    }
}

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable: network-level failures (timeout, connection reset), HTTP 429,
/// and 5xx server statuses. Everything else — 404, other 4xx, content-type
/// mismatches, invalid input, sink failures — is returned immediately, since
/// retrying cannot change the outcome.
fn is_retriable(err: &ScrapeError) -> bool {
    match err {
        ScrapeError::Http(_) | ScrapeError::RateLimited { .. } => true,
        ScrapeError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps `backoff_base_secs * 2^attempt`
/// seconds (capped at [`MAX_BACKOFF_SECS`]) and tries again, up to
/// `max_retries` additional attempts after the first try. When retries are
/// exhausted the last error is returned. Non-retriable errors are returned
/// without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                err
            }
        };

        let delay_secs = backoff_base_secs
            .saturating_mul(1u64 << attempt.min(62))
            .min(MAX_BACKOFF_SECS);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient fetch error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
