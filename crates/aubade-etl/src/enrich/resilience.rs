//! Resilience primitives for external lookups.

use std::future::Future;
use std::sync::Arc;

use backon::{ConstantBuilder, Retryable};
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

use crate::error::{EnrichError, EnrichResult};

/// Per-source rate limiter.
///
/// Limits throughput to a configurable number of requests per second by
/// combining a single-permit [`Semaphore`] with a fixed sleep interval.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl RateLimiter {
    /// Creates a new `RateLimiter` that allows at most
    /// `requests_per_second` requests per second.
    pub fn new(requests_per_second: u32) -> Self {
        Self::with_interval(Duration::from_millis(
            1000 / u64::from(requests_per_second.max(1)),
        ))
    }

    /// A limiter that spaces requests by `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval,
        }
    }

    /// Waits until a request slot is available, then holds the slot for
    /// the configured interval to enforce the rate limit.
    pub async fn acquire(&self) {
        // The semaphore is never closed.
        let _permit = self.semaphore.acquire().await.ok();
        sleep(self.interval).await;
    }
}

/// Fixed-delay retry for one external call.
///
/// Only transient errors (see [`EnrichError::is_transient`]) are retried;
/// anything else is returned on the first failure. That includes a 404,
/// which surfaces as [`EnrichError::NotFound`] after a single request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: usize,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// `attempts` counts the first try; it is raised to at least one.
    pub fn new(attempts: usize, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Run `op`, retrying transient failures until the attempt cap.
    pub async fn run<T, F, Fut>(&self, what: &str, op: F) -> EnrichResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = EnrichResult<T>>,
    {
        let backoff = ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.attempts - 1);

        op.retry(backoff)
            .sleep(sleep)
            .when(EnrichError::is_transient)
            .notify(|err: &EnrichError, after: Duration| {
                log::warn!("{} failed ({}), retrying in {:?}", what, err, after);
            })
            .await
    }
}
