//! Configuration loading from the process environment and JSON files

use crate::support::temp_csv;
use pricewatch_monitor::{MonitorConfig, MonitorError};
use serial_test::serial;
use std::fs;
use std::time::Duration;

const VARS: &[&str] = &[
    "PRICEWATCH_CONFIG",
    "PRICEWATCH_SYMBOL",
    "PRICEWATCH_INTERVAL_SECS",
    "PRICEWATCH_WINDOWS",
    "PRICEWATCH_OUTPUT",
    "BINANCE_API_KEY",
    "BINANCE_SECRET_KEY",
];

fn clear_env() {
    for var in VARS {
        // SAFETY: serialised by #[serial]; no other thread reads the environment.
        unsafe { std::env::remove_var(var) };
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: serialised by #[serial]; no other thread reads the environment.
    unsafe { std::env::set_var(key, value) };
}

#[test]
#[serial]
fn test_env_overrides_defaults() {
    clear_env();
    set_env("PRICEWATCH_SYMBOL", "ETHUSDT");
    set_env("PRICEWATCH_INTERVAL_SECS", "30");
    set_env("PRICEWATCH_WINDOWS", "7,25");

    let config = MonitorConfig::from_env().unwrap();
    assert_eq!(config.symbol, "ETHUSDT");
    assert_eq!(config.poll_interval(), Duration::from_secs(30));
    assert_eq!(config.poll_settings().windows, vec![7, 25]);

    clear_env();
}

#[test]
#[serial]
fn test_half_credentials_rejected() {
    clear_env();
    set_env("BINANCE_API_KEY", "only-the-key");

    let err = MonitorConfig::from_env().and_then(|c| c.validate().map(|_| c)).unwrap_err();
    assert!(matches!(err, MonitorError::Config(_)));

    clear_env();
}

#[test]
#[serial]
fn test_json_file_with_env_credentials() {
    clear_env();
    let path = temp_csv("pricewatch-config").with_extension("json");
    fs::write(&path, r#"{"symbol": "BTCUSDT", "poll_interval_secs": 5, "testnet": true}"#).unwrap();
    set_env("BINANCE_API_KEY", "abcdefgh12345678");
    set_env("BINANCE_SECRET_KEY", "secret12345678");

    let config = MonitorConfig::load(Some(&path)).unwrap();
    assert_eq!(config.symbol, "BTCUSDT");
    assert_eq!(config.poll_interval_secs, 5);
    assert_eq!(config.api_key, "abcdefgh12345678");
    assert!(config.binance_config().credentials().unwrap().is_some());

    fs::remove_file(&path).unwrap();
    clear_env();
}

#[test]
#[serial]
fn test_config_path_from_env() {
    clear_env();
    let path = temp_csv("pricewatch-config").with_extension("json");
    fs::write(&path, r#"{"symbol": "SOLUSDT"}"#).unwrap();
    set_env("PRICEWATCH_CONFIG", path.to_str().unwrap());

    let config = MonitorConfig::load(None).unwrap();
    assert_eq!(config.symbol, "SOLUSDT");

    fs::remove_file(&path).unwrap();
    clear_env();
}

#[test]
#[serial]
fn test_invalid_json_rejected() {
    clear_env();
    let path = temp_csv("pricewatch-config").with_extension("json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(MonitorConfig::load(Some(&path)), Err(MonitorError::Config(_))));

    fs::remove_file(&path).unwrap();
}
