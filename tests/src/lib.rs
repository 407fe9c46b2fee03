//! Cross-crate tests for the pricewatch workspace
//!
//! Everything here runs offline: the exchange is replaced by scripted feeds
//! and files go to the system temp directory.

#[cfg(test)]
mod support;
#[cfg(test)]
mod signer_tests;
#[cfg(test)]
mod poller_tests;
#[cfg(test)]
mod config_tests;
