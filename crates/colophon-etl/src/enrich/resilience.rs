//! Resilience primitives for external API calls.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

/// Paces calls to an external source.
///
/// Combines a single-permit [`Semaphore`] with a fixed sleep interval:
/// at most one call is in flight, and consecutive calls are spaced by
/// the configured interval.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl RateLimiter {
    /// Create a rate limiter that spaces calls by `interval`.
    ///
    /// An interval of zero disables pacing but still serialises calls.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval,
        }
    }

    /// Wait for a call slot.
    ///
    /// Holds the slot for the configured interval so the next caller
    /// observes the spacing.
    pub async fn acquire(&self) {
        // `acquire` only returns `Err` when the semaphore is closed,
        // which we never do, so `expect` is safe here.
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("rate limiter semaphore unexpectedly closed");
        sleep(self.interval).await;
    }
}
