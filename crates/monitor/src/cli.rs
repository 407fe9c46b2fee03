//! Command line of the `pricewatch` binary

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "Poll a Binance symbol and keep a CSV of prices and moving averages")]
pub struct Cli {
    /// JSON config file; falls back to PRICEWATCH_CONFIG, then PRICEWATCH_* variables
    pub config: Option<PathBuf>,
}
