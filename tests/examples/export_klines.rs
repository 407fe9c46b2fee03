//! Export historical candles for the configured symbol to CSV
//!
//! Usage:
//! ```
//! cargo run --example export_klines -- --limit 1000 --output bnb_1m.csv
//! ```

use pricewatch_monitor::prelude::*;
use pricewatch_monitor::write_klines_csv;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Export Binance klines to CSV")]
struct Args {
    /// Number of candles to fetch (Binance caps this at 1000)
    #[arg(short, long, default_value = "500")]
    limit: u32,

    /// Output CSV file; defaults to <SYMBOL>_<INTERVAL>.csv
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[monoio::main(enable_timer = true)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    let config = MonitorConfig::load(args.config.as_deref()).context("loading configuration")?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}_{}.csv", config.symbol, config.candle_interval)));

    let client = BinanceRestClient::new(config.binance_config())?;

    info!("📥 Fetching {} klines for {} ({})", args.limit, config.symbol, config.candle_interval);
    let klines = client.get_klines(&config.symbol, &config.candle_interval, Some(args.limit)).await?;

    if let (Some(first), Some(last)) = (klines.first(), klines.last()) {
        info!("   From {} to {}", first.open_time, last.open_time);
    }

    write_klines_csv(&output, &klines)?;
    info!("💾 Wrote {} candles to {}", klines.len(), output.display());
    Ok(())
}
