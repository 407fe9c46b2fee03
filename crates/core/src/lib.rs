//! # pricewatch core
//!
//! Shared primitives for the pricewatch workspace.
//!
//! ## Contents
//!
//! 1. **Timing** - wall-clock nanosecond timestamps and request timers
//! 2. **Fixed-point arithmetic** - exact decimal prices, quantities and averages
//! 3. **Unified logging** - one-shot tracing (or ftlog) initialisation
//! 4. **ID generation** - nanoid based client order ids

pub mod timing;
pub mod fixed;
pub mod logging;
pub mod id_gen;

// Re-export commonly used items
pub use timing::{nanos, timestamp_ms, PerfTimer, Timestamp};
pub use fixed::{Fixed, FixedError};
pub use logging::init_logging;
pub use id_gen::{generate_id, generate_client_order_id};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::timing::{nanos, timestamp_ms, PerfTimer, Timestamp};
    pub use crate::fixed::{Fixed, FixedError};
    pub use crate::id_gen::{generate_id, generate_client_order_id, generate_id_with_prefix};
    pub use crate::logging::init_logging;

    // Common external types
    pub use serde::{Deserialize, Serialize};
    pub use chrono::{DateTime, Utc};
}
