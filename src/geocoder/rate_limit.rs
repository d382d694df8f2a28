//! Minimum spacing between outgoing geocoding requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Cooperative limiter enforcing a minimum delay between calls.
///
/// The first call passes straight through. Each later call waits until
/// `min_delay` has elapsed since the previous one was let through. The
/// lock is held while waiting, so concurrent callers queue up.
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last: Mutex::new(None),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Wait for the next slot
    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.min_delay;
            if ready_at > Instant::now() {
                debug!(
                    "Rate limited, waiting {:?}",
                    ready_at.saturating_duration_since(Instant::now())
                );
                sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}
