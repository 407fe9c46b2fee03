//! Time source for the poller
//!
//! Sample timestamps and the inter-poll sleep both come from a [`Clock`] so
//! tests can drive the loop without waiting in real time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[async_trait(?Send)]
pub trait Clock {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall clock plus monoio timers
///
/// The runtime must be built with the timer driver enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait(?Send)]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        monoio::time::sleep(duration).await;
    }
}
