//! Monitor error types

use crate::series::SeriesError;
use pricewatch_exchanges::ExchangeError;
use thiserror::Error;

/// Result type for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Monitor errors
///
/// Only `Persistence` stops a running poller; price fetch and ordering
/// failures are logged and the iteration is skipped.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<csv::Error> for MonitorError {
    fn from(err: csv::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
