//! Built-in waiting mechanisms for action primitives
//!
//! All waits are blocking-with-timeout polls. The check always runs at least
//! once, so a zero timeout is an existence check.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// Polling cadence shared by every waiting primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSettings {
    /// Delay between two checks (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

impl WaitSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Run `check` until it yields `Some` or `timeout` elapses.
pub async fn poll_until<F, Fut, T>(timeout: Duration, interval: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    let mut rounds = 0u32;
    loop {
        rounds += 1;
        if let Some(value) = check().await {
            return Some(value);
        }
        let now = Instant::now();
        if now >= deadline {
            trace!(rounds, "poll window elapsed");
            return None;
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Fixed settle delay after a mutating action. Zero is a no-op.
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
