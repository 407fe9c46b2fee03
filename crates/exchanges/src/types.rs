//! Common exchange types and data structures
//!
//! Exchange-neutral values returned by the client traits. All prices and
//! quantities are exact decimals.

use pricewatch_core::prelude::*;
use std::str::FromStr;

/// Generic order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(format!("unknown order side: {other}")),
        }
    }
}

/// Generic order type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    Market,
    /// Good-till-cancelled limit order
    Limit { price: Fixed },
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit { .. } => write!(f, "LIMIT"),
        }
    }
}

/// Outcome of an executed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillSummary {
    /// Quantity-weighted average fill price
    pub price: Fixed,
    /// Total filled base quantity
    pub quantity: Fixed,
}

/// `LOT_SIZE` filter of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSize {
    pub min_qty: Fixed,
    pub max_qty: Fixed,
    pub step_size: Fixed,
}

impl LotSize {
    /// Decimal places allowed by the step size, usable as the client's quantity precision
    pub fn precision(&self) -> u32 {
        self.step_size.step_precision()
    }

    /// Whether `quantity` lies within `[min_qty, max_qty]`
    pub fn contains(&self, quantity: Fixed) -> bool {
        quantity >= self.min_qty && quantity <= self.max_qty
    }
}

/// OHLCV candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: Timestamp,
    pub open: Fixed,
    pub high: Fixed,
    pub low: Fixed,
    pub close: Fixed,
    pub volume: Fixed,
    pub close_time: Timestamp,
}
