//! Check Binance API credentials and connectivity
//!
//! 1. Loads credentials from .env
//! 2. Pings the REST API and compares clocks
//! 3. Reads account balances (signed)
//! 4. Reads the monitored symbol's price and trading filters

use pricewatch_core::prelude::*;
use pricewatch_exchanges::binance::{BinanceConfig, BinanceRestClient};
use pricewatch_exchanges::ExchangeError;
use std::env;

#[monoio::main(enable_timer = true)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    println!("🚀 pricewatch Binance credentials check");
    println!("=======================================");

    dotenv::dotenv().ok();

    let use_testnet = env::var("BINANCE_TESTNET")
        .unwrap_or_else(|_| "true".to_string())
        .parse::<bool>()
        .unwrap_or(true);
    let symbol = env::var("PRICEWATCH_SYMBOL").unwrap_or_else(|_| "BNBUSDT".to_string());

    let base = if use_testnet {
        BinanceConfig::testnet()
    } else {
        BinanceConfig::default()
    };
    let config = match base.with_env_credentials() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            eprintln!("   Set BINANCE_API_KEY and BINANCE_SECRET_KEY in .env");
            return Err(e.into());
        }
    };

    let client = BinanceRestClient::new(config)?;
    println!("   Using testnet: {use_testnet}");
    println!();

    println!("🔗 Testing REST API connectivity...");
    client.ping().await?;
    let server_time = client.server_time().await?;
    let time_diff = (server_time as i64 - timestamp_ms() as i64).abs();
    println!("✅ REST API connectivity: OK");
    if time_diff > 1000 {
        println!("⚠️  WARNING: Time difference > 1s: {time_diff}ms");
        println!("   Signed requests may be rejected outside recvWindow");
    } else {
        println!("✅ Time synchronization: OK ({time_diff}ms diff)");
    }
    println!();

    println!("🔐 Testing API authentication...");
    match client.get_account_balances().await {
        Ok(balances) => {
            println!("✅ API authentication: OK");
            let non_zero: Vec<_> = balances.iter().filter(|(_, free)| free.is_positive()).collect();
            println!("   Assets with a free balance: {}", non_zero.len());
            for (asset, free) in non_zero.iter().take(5) {
                println!("     {asset}: {free}");
            }
        }
        Err(e @ (ExchangeError::AuthenticationFailed(_) | ExchangeError::InvalidCredentials)) => {
            eprintln!("❌ API authentication failed: {e}");
            eprintln!("   Check the key, the secret and the 'Read Info' permission");
            return Err(e.into());
        }
        Err(e) => {
            eprintln!("❌ Account request failed: {e}");
            return Err(e.into());
        }
    }
    println!();

    println!("📊 Testing market data for {symbol}...");
    match client.get_current_price(&symbol).await {
        Ok(price) => println!("✅ {symbol} price: {price}"),
        Err(e) => eprintln!("⚠️  Price request failed: {e}"),
    }
    match client.get_lot_size_constraints(&symbol).await {
        Ok(lot) => println!(
            "✅ LOT_SIZE: min {} max {} step {} ({} decimals)",
            lot.min_qty.normalize(),
            lot.max_qty.normalize(),
            lot.step_size.normalize(),
            lot.precision()
        ),
        Err(e) => eprintln!("⚠️  LOT_SIZE request failed: {e}"),
    }
    match client.get_min_notional(&symbol).await {
        Ok(min) => println!("✅ Minimum order value: {}", min.normalize()),
        Err(e) => eprintln!("⚠️  NOTIONAL request failed: {e}"),
    }
    println!();

    println!("🎉 Credentials check completed");
    if !use_testnet {
        println!("⚠️  WARNING: You're using PRODUCTION credentials!");
    }

    Ok(())
}
