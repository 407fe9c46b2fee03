//! # pricewatch monitor
//!
//! Polls a symbol's latest price, keeps the rolling series in memory and
//! rewrites a CSV table of prices and moving averages after every poll.
//!
//! Everything is constructed explicitly by the caller:
//!
//! ```no_run
//! use pricewatch_monitor::prelude::*;
//!
//! #[monoio::main(enable_timer = true)]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MonitorConfig::load(None)?;
//!     let client = BinanceRestClient::new(config.binance_config())?;
//!     let sink = CsvSink::new(&config.output_path);
//!     let mut poller = Poller::new(client, SystemClock, sink, config.poll_settings());
//!
//!     let (trigger, mut shutdown) = shutdown_channel();
//!     monoio::spawn(listen_for_ctrl_c(trigger));
//!     poller.run(&mut shutdown).await?;
//!     Ok(())
//! }
//! ```

pub mod series;
pub mod sink;
pub mod clock;
pub mod shutdown;
pub mod poller;
pub mod config;
pub mod error;
pub mod cli;

pub use series::{DEFAULT_WINDOWS, RollingRow, RollingStats, Sample, Series, SeriesError, SeriesRow};
pub use sink::{CsvSink, SeriesSink, write_klines_csv};
pub use clock::{Clock, SystemClock};
pub use shutdown::{Shutdown, ShutdownTrigger, listen_for_ctrl_c, shutdown_channel};
pub use poller::{PollOutcome, PollSettings, Poller, PollerState};
pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use cli::Cli;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::series::{DEFAULT_WINDOWS, RollingStats, Sample, Series};
    pub use crate::sink::{CsvSink, SeriesSink};
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::shutdown::{Shutdown, ShutdownTrigger, listen_for_ctrl_c, shutdown_channel};
    pub use crate::poller::{PollOutcome, PollSettings, Poller};
    pub use crate::config::MonitorConfig;
    pub use crate::error::MonitorError;
    pub use pricewatch_exchanges::prelude::*;
}
