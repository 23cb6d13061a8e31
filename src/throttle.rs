//! Request pacing.
//!
//! Enforces a minimum interval between requests. The interval counts from the
//! previous request start, or from the last [`Throttle::mark`] if that came later.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Default pause between batch requests, in milliseconds
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Default pause between batch requests
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(DEFAULT_DELAY_MS);

/// Delay-between-requests policy
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// A throttle that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait until the interval since the previous request has elapsed.
    ///
    /// The first call returns immediately.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if !self.interval.is_zero() {
            if let Some(prev) = *last {
                let elapsed = prev.elapsed();
                if elapsed < self.interval {
                    let remaining = self.interval - elapsed;
                    debug!(wait_ms = remaining.as_millis() as u64, "Throttling");
                    tokio::time::sleep(remaining).await;
                }
            }
        }

        *last = Some(Instant::now());
    }

    /// Restart the interval now, e.g. once a batch has been written.
    pub async fn mark(&self) {
        *self.last_request.lock().await = Some(Instant::now());
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
