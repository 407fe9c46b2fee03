//! # pricewatch exchange integrations
//!
//! Binance spot REST access for the price monitor and its trading helpers.
//!
//! ## Architecture
//!
//! - **monoio-based HTTPS client** - rustls over monoio TCP, one request per connection
//! - **HMAC-SHA256 signing** - canonical query strings with fresh timestamps
//! - **Fixed-point arithmetic** - prices, balances and quantities stay exact decimals
//! - **Narrow traits** - the poller depends on [`PriceFeed`] only

pub mod binance;
pub mod traits;
pub mod types;
pub mod errors;
pub mod http;

// Re-export main types
pub use binance::{BinanceConfig, BinanceRestClient};
pub use traits::{ExchangeClient, PriceFeed};
pub use types::*;
pub use errors::{ExchangeError, Result};
pub use http::MonoioHttpsClient;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::binance::{BinanceConfig, BinanceCredentials, BinanceRestClient, QueryParams, RequestSigner};
    pub use crate::traits::{ExchangeClient, PriceFeed};
    pub use crate::types::*;
    pub use crate::errors::{ExchangeError, Result};
    pub use crate::http::MonoioHttpsClient;
    pub use pricewatch_core::prelude::*;
}
