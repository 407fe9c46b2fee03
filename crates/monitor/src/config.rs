//! Monitor configuration
//!
//! Loaded either from a JSON file or from `PRICEWATCH_*` environment
//! variables (a `.env` file is honoured). Binance credentials always fall
//! back to `BINANCE_API_KEY` / `BINANCE_SECRET_KEY`.

use crate::error::{MonitorError, Result};
use crate::poller::PollSettings;
use crate::series::DEFAULT_WINDOWS;
use pricewatch_exchanges::BinanceConfig;
use pricewatch_exchanges::binance::DEFAULT_QUANTITY_PRECISION;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_VAR: &str = "PRICEWATCH_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub symbol: String,
    pub poll_interval_secs: u64,
    /// Candle interval used for historical exports
    pub candle_interval: String,
    pub output_path: PathBuf,
    pub windows: Vec<usize>,
    pub base_url: Option<String>,
    pub testnet: bool,
    pub timeout_ms: u64,
    pub quantity_precision: u32,
    pub api_key: String,
    pub api_secret: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            symbol: "BNBUSDT".to_string(),
            poll_interval_secs: 15,
            candle_interval: "1m".to_string(),
            output_path: PathBuf::from("real_data_15s.csv"),
            windows: DEFAULT_WINDOWS.to_vec(),
            base_url: None,
            testnet: false,
            timeout_ms: 10_000,
            quantity_precision: DEFAULT_QUANTITY_PRECISION,
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

impl MonitorConfig {
    /// Config file from the first CLI argument or `PRICEWATCH_CONFIG`, else the environment
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let file = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from));

        let mut config = match file {
            Some(path) => {
                info!("📄 Loading config from {}", path.display());
                Self::from_json_file(&path)?
            }
            None => Self::from_env()?,
        };

        if config.api_key.is_empty() && config.api_secret.is_empty() {
            config.api_key = std::env::var("BINANCE_API_KEY").unwrap_or_default();
            config.api_secret = std::env::var("BINANCE_SECRET_KEY").unwrap_or_default();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(symbol) = lookup("PRICEWATCH_SYMBOL") {
            config.symbol = symbol;
        }
        if let Some(secs) = lookup("PRICEWATCH_INTERVAL_SECS") {
            config.poll_interval_secs = parse_var("PRICEWATCH_INTERVAL_SECS", &secs)?;
        }
        if let Some(interval) = lookup("PRICEWATCH_CANDLE_INTERVAL") {
            config.candle_interval = interval;
        }
        if let Some(path) = lookup("PRICEWATCH_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        if let Some(windows) = lookup("PRICEWATCH_WINDOWS") {
            config.windows = windows
                .split(',')
                .map(|w| parse_var("PRICEWATCH_WINDOWS", w.trim()))
                .collect::<Result<_>>()?;
        }
        if let Some(url) = lookup("PRICEWATCH_BASE_URL") {
            config.base_url = Some(url);
        }
        if let Some(testnet) = lookup("PRICEWATCH_TESTNET") {
            config.testnet = parse_var("PRICEWATCH_TESTNET", &testnet)?;
        }
        if let Some(timeout) = lookup("PRICEWATCH_TIMEOUT_MS") {
            config.timeout_ms = parse_var("PRICEWATCH_TIMEOUT_MS", &timeout)?;
        }
        if let Some(precision) = lookup("PRICEWATCH_QUANTITY_PRECISION") {
            config.quantity_precision = parse_var("PRICEWATCH_QUANTITY_PRECISION", &precision)?;
        }
        config.api_key = lookup("BINANCE_API_KEY").unwrap_or_default();
        config.api_secret = lookup("BINANCE_SECRET_KEY").unwrap_or_default();

        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::Config(format!("{}: {e}", path.display())))?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(MonitorError::Config("symbol must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(MonitorError::Config("poll interval must be positive".to_string()));
        }
        if !self.windows.iter().any(|&w| w > 0) {
            return Err(MonitorError::Config("at least one window must be positive".to_string()));
        }
        if self.api_key.is_empty() != self.api_secret.is_empty() {
            return Err(MonitorError::Config(
                "BINANCE_API_KEY and BINANCE_SECRET_KEY must be set together".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::new(self.symbol.clone())
            .with_interval(self.poll_interval())
            .with_windows(self.windows.clone())
    }

    pub fn binance_config(&self) -> BinanceConfig {
        let mut config = if self.testnet {
            BinanceConfig::testnet()
        } else {
            BinanceConfig::default()
        };
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        config
            .with_credentials(self.api_key.clone(), self.api_secret.clone())
            .with_timeout_ms(self.timeout_ms)
            .with_quantity_precision(self.quantity_precision)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| MonitorError::Config(format!("invalid value for {key}: {value:?}")))
}
