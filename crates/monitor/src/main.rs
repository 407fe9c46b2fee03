//! `pricewatch [config.json]`
//!
//! Polls the configured symbol until Ctrl-C, rewriting the CSV after every
//! sample.

use pricewatch_monitor::prelude::*;

use anyhow::Context;
use clap::Parser;
use pricewatch_monitor::Cli;
use tracing::info;

#[monoio::main(enable_timer = true)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = MonitorConfig::load(cli.config.as_deref()).context("loading configuration")?;

    info!("🚀 pricewatch starting");
    info!("   Symbol: {}", config.symbol);
    info!("   Interval: {:?}", config.poll_interval());
    info!("   Output: {}", config.output_path.display());

    let client = BinanceRestClient::new(config.binance_config()).context("creating Binance client")?;
    let sink = CsvSink::new(&config.output_path);
    let mut poller = Poller::new(client, SystemClock, sink, config.poll_settings());

    let (trigger, mut shutdown) = shutdown_channel();
    monoio::spawn(listen_for_ctrl_c(trigger));

    poller.run(&mut shutdown).await.context("polling stopped")?;
    Ok(())
}
