//! ID generation
//!
//! nanoid based identifiers. Binance accepts client order ids of at most 36
//! characters drawn from `[.A-Z:/a-z0-9_-]`.

use nanoid::nanoid;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum length Binance accepts for `newClientOrderId`
pub const MAX_CLIENT_ORDER_ID_LEN: usize = 36;

/// Generate a 12 character nanoid
pub fn generate_id() -> String {
    nanoid!(12)
}

/// Generate a unique ID with prefix and millisecond timestamp
pub fn generate_id_with_prefix(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let short_id = nanoid!(8, &nanoid::alphabet::SAFE);
    format!("{prefix}-{timestamp}-{short_id}")
}

/// Client order id for a new order, truncated to the exchange limit
pub fn generate_client_order_id() -> String {
    generate_id_with_prefix("PW")
        .chars()
        .take(MAX_CLIENT_ORDER_ID_LEN)
        .collect()
}
