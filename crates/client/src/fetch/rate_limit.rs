//! Process-wide rate gate for outbound requests.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between outbound requests.
///
/// The lock is held across the wait, so callers pass the gate one at a time
/// and request starts are totally ordered. Waiters are not promised FIFO order.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_interval }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the interval since the previous request has elapsed, then
    /// claim the gate. Returns how long the caller was held back.
    pub async fn acquire(&self) -> Duration {
        let mut last = self.last_request.lock().await;
        let mut waited = Duration::ZERO;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                waited = self.min_interval - elapsed;
                tracing::debug!(wait_ms = waited.as_millis() as u64, "rate gate holding request");
                tokio::time::sleep(waited).await;
            }
        }
        *last = Some(Instant::now());
        waited
    }

    /// When the gate was last claimed.
    pub async fn last_request(&self) -> Option<Instant> {
        *self.last_request.lock().await
    }
}
