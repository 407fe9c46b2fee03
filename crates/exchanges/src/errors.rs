//! Exchange-specific error types
//!
//! Every failure of the exchange layer is an [`ExchangeError`]. Binance error
//! payloads (`{"code": -2010, "msg": "..."}`) are mapped onto the variants by
//! [`classify_error`] so callers can tell transient transport problems from
//! credential problems and business-rule rejections.

use thiserror::Error;

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Exchange operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Timestamp outside recvWindow (check the local clock): {0}")]
    TimestampOutsideWindow(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Exchange rejected request ({code}): {msg}")]
    ExchangeRejected { code: i64, msg: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Fixed point error: {0}")]
    FixedPointError(String),
}

impl ExchangeError {
    /// Failures that the next attempt may not hit again
    ///
    /// A `timestamp` outside `recvWindow` counts: every signed call carries a
    /// fresh one.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::Timeout(_) | Self::TimestampOutsideWindow(_)
        )
    }

    /// Credential rejections that will keep failing until the operator acts
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::MissingCredentials(_) | Self::InvalidCredentials
        )
    }
}

impl From<pricewatch_core::FixedError> for ExchangeError {
    fn from(err: pricewatch_core::FixedError) -> Self {
        Self::FixedPointError(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Binance API error codes the client reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unknown,
    /// -1013: a symbol filter (LOT_SIZE, NOTIONAL...) rejected the order
    FilterFailure,
    /// -1021: timestamp outside of recvWindow
    TimestampOutsideWindow,
    /// -1022: signature for this request is not valid
    InvalidSignature,
    /// -1100..-1106: malformed or missing parameter
    BadParameter,
    /// -1111: precision over the maximum defined for this asset
    BadPrecision,
    /// -1121: invalid symbol
    InvalidSymbol,
    /// -2010: new order rejected
    NewOrderRejected,
    /// -2014: API-key format invalid
    BadApiKeyFormat,
    /// -2015: invalid API-key, IP, or permissions for action
    RejectedMbxKey,
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            -1013 => ErrorCode::FilterFailure,
            -1021 => ErrorCode::TimestampOutsideWindow,
            -1022 => ErrorCode::InvalidSignature,
            -1106..=-1100 => ErrorCode::BadParameter,
            -1111 => ErrorCode::BadPrecision,
            -1121 => ErrorCode::InvalidSymbol,
            -2010 => ErrorCode::NewOrderRejected,
            -2014 => ErrorCode::BadApiKeyFormat,
            -2015 => ErrorCode::RejectedMbxKey,
            _ => ErrorCode::Unknown,
        }
    }
}

/// Binance error payload
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

/// Map a non-2xx HTTP response onto an [`ExchangeError`]
pub fn classify_error(status: u16, body: &str) -> ExchangeError {
    let Ok(api) = serde_json::from_str::<ApiErrorBody>(body) else {
        return match status {
            401 | 403 => ExchangeError::AuthenticationFailed(format!("HTTP {status}")),
            _ => ExchangeError::HttpError(status, body.to_string()),
        };
    };

    let msg_lower = api.msg.to_lowercase();
    match ErrorCode::from(api.code) {
        ErrorCode::InvalidSignature | ErrorCode::BadApiKeyFormat | ErrorCode::RejectedMbxKey => {
            ExchangeError::AuthenticationFailed(api.msg)
        }
        ErrorCode::TimestampOutsideWindow => ExchangeError::TimestampOutsideWindow(api.msg),
        ErrorCode::InvalidSymbol => ExchangeError::NotFound(api.msg),
        ErrorCode::NewOrderRejected if msg_lower.contains("insufficient balance") => {
            ExchangeError::InsufficientBalance(api.msg)
        }
        ErrorCode::FilterFailure | ErrorCode::BadPrecision | ErrorCode::BadParameter
            if msg_lower.contains("quantity") || msg_lower.contains("lot_size") =>
        {
            ExchangeError::InvalidQuantity(api.msg)
        }
        _ if status == 401 || status == 403 => ExchangeError::AuthenticationFailed(api.msg),
        _ => ExchangeError::ExchangeRejected {
            code: api.code,
            msg: api.msg,
        },
    }
}
