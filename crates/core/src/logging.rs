//! Unified logging integration
//!
//! Installs a `tracing-subscriber` formatter filtered by `RUST_LOG` (default
//! `info`). With the `ftlog` feature enabled the tracing events are forwarded
//! through the `log` facade into ftlog's background writer instead.

#[cfg(not(feature = "ftlog"))]
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use std::sync::Once;

static INIT: Once = Once::new();

/// Default filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize the global logger; later calls are no-ops
pub fn init_logging() {
    INIT.call_once(|| {
        #[cfg(feature = "ftlog")]
        {
            init_ftlog();
        }

        #[cfg(not(feature = "ftlog"))]
        {
            init_tracing();
        }
    });
}

#[cfg(feature = "ftlog")]
fn init_ftlog() {
    match ftlog::builder()
        .max_log_level(ftlog::LevelFilter::Info)
        .bounded(100_000, false)
        .utc()
        .try_init()
    {
        // The guard flushes on drop; the logger lives for the whole process.
        Ok(guard) => std::mem::forget(guard),
        Err(e) => eprintln!("failed to initialize ftlog: {e}"),
    }

    tracing::info!("📝 Initialized ftlog logging");
}

#[cfg(not(feature = "ftlog"))]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
        )
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    // Another subscriber (e.g. a test harness) may already be installed.
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::info!("📝 Initialized tracing logging");
    }
}

/// Log a failed operation with a uniform prefix
#[macro_export]
macro_rules! log_error {
    ($operation:expr, $error:expr) => {
        tracing::error!("❌ {} failed: {}", $operation, $error);
    };
}

/// Log a filled order
#[macro_export]
macro_rules! log_trade {
    ($side:expr, $symbol:expr, $quantity:expr, $price:expr) => {
        tracing::info!("💰 TRADE: {} {} {} @ {}", $side, $symbol, $quantity, $price);
    };
}
