use std::time::Duration;

use tokio::time::Instant;

/// Minimum spacing between consecutive calls to the email api within a single
/// request. The api rejects bursts (2 requests per second at the time of
/// writing), so a submission that makes three calls has to slow down before the
/// third.
///
/// This only holds configuration; the actual bookkeeping lives in the
/// per-request `Pacer`, so concurrent submissions never wait on each other.
#[derive(Clone, Copy, Debug)]
pub struct RateLimiter {
    interval: Duration,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self { Self { interval } }

    /// A limiter that never waits (for tests)
    pub fn disabled() -> Self { Self::new(Duration::ZERO) }

    pub fn interval(&self) -> Duration { self.interval }

    pub fn pacer(&self) -> Pacer {
        Pacer {
            interval: self.interval,
            last_call: None,
        }
    }
}

/// Tracks when the last external call of a request completed
pub struct Pacer {
    interval: Duration,
    last_call: Option<Instant>,
}

impl Pacer {
    /// Mark an external call as just completed
    pub fn record_call(&mut self) { self.last_call = Some(Instant::now()); }

    /// Wait until the next call is allowed. Returns immediately if no call was
    /// recorded, or if enough time has already passed.
    pub async fn ready(&self) {
        if let Some(last) = self.last_call {
            let due = last + self.interval;
            if due > Instant::now() {
                tracing::debug!(
                    wait_ms = (due - Instant::now()).as_millis() as u64,
                    "pacing before next email api call"
                );
                tokio::time::sleep_until(due).await;
            }
        }
    }
}
