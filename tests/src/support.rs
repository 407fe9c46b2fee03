//! Test doubles shared by the integration tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pricewatch_core::Fixed;
use pricewatch_exchanges::{ExchangeError, PriceFeed, Result as ExchangeResult};
use pricewatch_monitor::{Clock, ShutdownTrigger};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

/// Replays a fixed list of price responses, then fails with a network error
pub struct ScriptedFeed {
    script: RefCell<VecDeque<ExchangeResult<Fixed>>>,
    calls: Cell<usize>,
}

impl ScriptedFeed {
    pub fn new(script: Vec<ExchangeResult<Fixed>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: Cell::new(0),
        }
    }

    pub fn prices(prices: &[i64]) -> Self {
        Self::new(prices.iter().map(|p| Ok(Fixed::from_i64(*p))).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl PriceFeed for ScriptedFeed {
    async fn current_price(&self, _symbol: &str) -> ExchangeResult<Fixed> {
        self.calls.set(self.calls.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::NetworkError("script exhausted".to_string())))
    }
}

/// Advances 15 seconds per `now()`; `sleep` returns at once and fires the
/// trigger after `stop_after` sleeps
pub struct ManualClock {
    now: Cell<i64>,
    sleeps: Cell<usize>,
    stop_after: usize,
    trigger: ShutdownTrigger,
}

impl ManualClock {
    pub fn new(stop_after: usize, trigger: ShutdownTrigger) -> Self {
        Self {
            now: Cell::new(0),
            sleeps: Cell::new(0),
            stop_after,
            trigger,
        }
    }

    pub fn sleeps(&self) -> usize {
        self.sleeps.get()
    }
}

#[async_trait(?Send)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.now.get();
        self.now.set(secs + 15);
        at(secs)
    }

    async fn sleep(&self, _duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        if self.sleeps.get() >= self.stop_after {
            self.trigger.trigger();
        }
    }
}

/// `2023-11-14T22:13:20Z` plus `secs`
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Unique CSV path in the temp directory
pub fn temp_csv(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{prefix}-{}.csv", nanoid::nanoid!(10)))
}
