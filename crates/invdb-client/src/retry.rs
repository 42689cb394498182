//! Retry policy for devices API requests.
//!
//! Only transient failures (connect errors, timeouts, 5xx) are retried.
//! Rejections the server made on purpose (4xx) and malformed bodies are
//! returned immediately. Upserts are idempotent on the `PK`/`SK` pair, so
//! replaying one is safe.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ClientError::Api { status, .. } => *status >= 500,
        ClientError::Deserialize { .. } | ClientError::InvalidBaseUrl { .. } => false,
    }
}

/// How many times, and how patiently, a request is replayed.
///
/// The n-th retry waits `backoff_base_ms * 2^(n-1)` ms, capped at 30 s, then
/// scaled by a random factor in `0.75..1.25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) max_retries: u32,
    pub(crate) backoff_base_ms: u64,
}

impl RetryPolicy {
    const MAX_DELAY_MS: u64 = 30_000;

    /// Delay before the `retry`-th replay (1-based), before jitter.
    fn base_delay_ms(self, retry: u32) -> u64 {
        let doublings = retry.saturating_sub(1).min(10);
        self.backoff_base_ms
            .saturating_mul(1u64 << doublings)
            .min(Self::MAX_DELAY_MS)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn jittered_delay_ms(self, retry: u32) -> u64 {
        let base = self.base_delay_ms(retry) as f64;
        (base * (0.75 + rand::random::<f64>() * 0.5)) as u64
    }

    /// Runs `operation`, replaying it on transient errors.
    ///
    /// `request` names the call in log events (e.g. `"POST /devices (freezer/7)"`).
    /// With `max_retries == 0` the operation runs exactly once.
    pub(crate) async fn run<T, F, Fut>(
        self,
        request: &str,
        mut operation: F,
    ) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut retries = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if retries >= self.max_retries || !is_retriable(&err) {
                if retries > 0 {
                    tracing::warn!(request, retries, error = %err, "devices API request gave up");
                }
                return Err(err);
            }

            retries += 1;
            let delay_ms = self.jittered_delay_ms(retries);
            tracing::warn!(
                request,
                retry = retries,
                of = self.max_retries,
                delay_ms,
                error = %err,
                "devices API request failed transiently, replaying"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }
}
