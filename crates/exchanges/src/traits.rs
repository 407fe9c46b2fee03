//! Exchange traits defining common interfaces
//!
//! The polling loop only needs [`PriceFeed`]; trading helpers use the wider
//! [`ExchangeClient`]. Both are `?Send` because everything runs on a single
//! monoio thread.

use crate::errors::Result;
use crate::types::*;
use async_trait::async_trait;
use pricewatch_core::Fixed;
use std::collections::BTreeMap;

/// Source of the latest traded price for a symbol
#[async_trait(?Send)]
pub trait PriceFeed {
    /// Latest price; always strictly positive on success
    async fn current_price(&self, symbol: &str) -> Result<Fixed>;
}

/// Market data, account and order operations of a spot exchange
#[async_trait(?Send)]
pub trait ExchangeClient: PriceFeed {
    /// Free balance per asset (signed)
    async fn account_balances(&self) -> Result<BTreeMap<String, Fixed>>;

    /// Submit an order; quantity is truncated to the allowed precision first (signed)
    async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Fixed,
        order_type: OrderType,
    ) -> Result<FillSummary>;

    /// `LOT_SIZE` constraints of a symbol
    async fn lot_size_constraints(&self, symbol: &str) -> Result<LotSize>;

    /// Minimum order value in the quote asset
    async fn min_notional(&self, symbol: &str) -> Result<Fixed>;
}
