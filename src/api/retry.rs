//! Backoff, rate limiting and timeout helpers for API requests

use crate::errors::{ApiError, ApiResult};
use std::cell::Cell;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Next backoff duration: `min(current * multiplier, max_backoff)`
///
/// # Example
/// ```
/// use std::time::Duration;
/// use guild_log_analysis::api::calculate_next_backoff;
///
/// let next = calculate_next_backoff(Duration::from_millis(1000), 2.0, 30);
/// assert_eq!(next, Duration::from_millis(2000));
/// ```
pub fn calculate_next_backoff(
    current_backoff: Duration,
    multiplier: f64,
    max_backoff_seconds: u64,
) -> Duration {
    Duration::from_millis((current_backoff.as_millis() as f64 * multiplier) as u64)
        .min(Duration::from_secs(max_backoff_seconds))
}

/// Await `operation`, failing with [`ApiError::Timeout`] after `timeout_seconds`
pub async fn execute_with_timeout<T, F>(timeout_seconds: u64, operation: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    timeout(Duration::from_secs(timeout_seconds), operation)
        .await
        .map_err(|_| ApiError::Timeout { timeout_seconds })?
}

/// Enforces a minimum interval between consecutive requests
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Cell<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Cell::new(None),
        }
    }

    /// How long a request issued at `now` has to wait
    pub fn delay_at(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request.get()?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.min_interval).then(|| self.min_interval - elapsed)
    }

    pub fn mark(&self, at: Instant) {
        self.last_request.set(Some(at));
    }

    /// Sleep until the next request is allowed, then record it
    pub async fn acquire(&self) {
        if let Some(delay) = self.delay_at(Instant::now()) {
            tracing::debug!("Rate limiting: sleeping for {:?}", delay);
            tokio::time::sleep(delay).await;
        }
        self.mark(Instant::now());
    }
}
