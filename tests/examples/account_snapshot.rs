//! Print balances and trading filters, optionally buying a fixed quote amount
//!
//! Set `PRICEWATCH_BUY_QUOTE=10` to place a market BUY worth 10 USDT.
//! Orders are only placed against the testnet.

use pricewatch_monitor::prelude::*;

use anyhow::{Context, bail};
use tracing::{info, warn};

#[monoio::main(enable_timer = true)]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = MonitorConfig::load(None).context("loading configuration")?;
    let client = BinanceRestClient::new(config.binance_config())?;
    if !client.is_authenticated() {
        bail!("BINANCE_API_KEY and BINANCE_SECRET_KEY are required");
    }

    let balances = client.account_balances().await?;
    info!("💼 Balances");
    for (asset, free) in balances.iter().filter(|(_, free)| free.is_positive()) {
        info!("   {}: {}", asset, free);
    }

    let symbol = config.symbol.as_str();
    let lot = client.lot_size_constraints(symbol).await?;
    let min_notional = client.min_notional(symbol).await?;
    info!("📏 {} LOT_SIZE step {} ({} decimals), min notional {}",
        symbol, lot.step_size.normalize(), lot.precision(), min_notional.normalize());

    let Ok(raw) = std::env::var("PRICEWATCH_BUY_QUOTE") else {
        return Ok(());
    };
    if !config.testnet {
        warn!("⚠️ PRICEWATCH_BUY_QUOTE ignored outside testnet");
        return Ok(());
    }

    let quote = Fixed::from_str_exact(&raw).context("PRICEWATCH_BUY_QUOTE must be a decimal")?;
    if quote < min_notional {
        bail!("{quote} is below the minimum order value {min_notional}");
    }

    // Exchange step size beats the configured default.
    let client = BinanceRestClient::new(config.binance_config().with_quantity_precision(lot.precision()))?;
    let fill = client.place_quote_order(symbol, quote).await?;
    info!("✅ Bought {} {} at {}", fill.quantity, symbol, fill.price);

    Ok(())
}
