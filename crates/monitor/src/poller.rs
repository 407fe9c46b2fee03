//! Polling loop
//!
//! Each iteration fetches the latest price, appends it to the series,
//! recomputes the moving averages and persists the table. A failed fetch
//! skips the iteration; a failed write stops the loop.

use crate::clock::Clock;
use crate::error::Result;
use crate::series::{DEFAULT_WINDOWS, RollingStats, Sample, Series};
use crate::shutdown::Shutdown;
use crate::sink::SeriesSink;
use pricewatch_core::log_error;
use pricewatch_exchanges::PriceFeed;

use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Interval between polls unless configured otherwise
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// What to poll and how often
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub symbol: String,
    pub interval: Duration,
    pub windows: Vec<usize>,
}

impl PollSettings {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: DEFAULT_POLL_INTERVAL,
            windows: DEFAULT_WINDOWS.to_vec(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_windows(mut self, windows: Vec<usize>) -> Self {
        self.windows = windows;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Running,
    Stopped,
}

/// Result of one iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A sample was stored; carries the averages after the append
    Appended(RollingStats),
    /// No sample was stored this time
    Skipped,
}

pub struct Poller<F, C, S> {
    feed: F,
    clock: C,
    sink: S,
    settings: PollSettings,
    series: Series,
    state: PollerState,
}

impl<F, C, S> Poller<F, C, S>
where
    F: PriceFeed,
    C: Clock,
    S: SeriesSink,
{
    pub fn new(feed: F, clock: C, sink: S, settings: PollSettings) -> Self {
        let series = Series::new(settings.symbol.clone());
        Self {
            feed,
            clock,
            sink,
            settings,
            series,
            state: PollerState::Stopped,
        }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// One fetch / append / recompute / persist cycle
    pub async fn poll_once(&mut self) -> Result<PollOutcome> {
        let symbol = &self.settings.symbol;

        let price = match self.feed.current_price(symbol).await {
            Ok(price) => price,
            Err(e) => {
                warn!("⚠️ Failed to fetch current price for {}: {}", symbol, e);
                return Ok(PollOutcome::Skipped);
            }
        };

        let sample = Sample::new(self.clock.now(), price);
        if let Err(e) = self.series.append(sample) {
            error!("❌ Dropping sample for {}: {}", symbol, e);
            return Ok(PollOutcome::Skipped);
        }

        info!("📈 {} price: {} ({} samples)", symbol, price, self.series.len());

        let stats = self.series.recompute_rolling_stats(&self.settings.windows);
        for (window, avg) in stats.iter() {
            debug!("   MA_{}: {}", window, avg);
        }

        self.sink.persist(&self.series, &self.settings.windows)?;
        Ok(PollOutcome::Appended(stats))
    }

    /// Poll until `shutdown` fires or persisting fails
    pub async fn run(&mut self, shutdown: &mut Shutdown) -> Result<()> {
        self.state = PollerState::Running;
        info!(
            "🚀 Polling {} every {:?} (windows {:?})",
            self.settings.symbol, self.settings.interval, self.settings.windows
        );

        let result = self.run_until(shutdown).await;

        self.state = PollerState::Stopped;
        match &result {
            Ok(()) => info!("✅ Poller stopped after {} samples", self.series.len()),
            Err(e) => log_error!("Polling", e),
        }
        result
    }

    async fn run_until(&mut self, shutdown: &mut Shutdown) -> Result<()> {
        loop {
            if shutdown.is_triggered() {
                return Ok(());
            }

            self.poll_once().await?;

            let interval = self.settings.interval;
            monoio::select! {
                _ = self.clock.sleep(interval) => {}
                _ = shutdown.wait() => return Ok(()),
            }
        }
    }
}
