//! Binance spot integration
//!
//! [`BinanceRestClient`] covers the market data, account and order endpoints
//! the monitor and the trading helpers need. Request signing lives in
//! [`auth`] so it can be tested without a network.

pub mod rest;
pub mod auth;

pub use rest::{BinanceConfig, BinanceRestClient, ExchangeInfo, SymbolInfo, DEFAULT_QUANTITY_PRECISION};
pub use auth::{BinanceCredentials, ParamValue, QueryParams, RequestSigner, sign};
