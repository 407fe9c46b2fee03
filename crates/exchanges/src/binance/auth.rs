//! Binance authentication and request signing
//!
//! Signed endpoints take the canonical query string (keys sorted ascending,
//! `key=value` joined by `&`), an HMAC-SHA256 of it keyed with the API secret,
//! and the lowercase hex digest appended as the trailing `signature`
//! parameter. The signer never adds a timestamp itself: callers insert a
//! fresh `timestamp` right before signing.

use crate::errors::{ExchangeError, Result};
use pricewatch_core::Fixed;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Name of the parameter carrying the signature
pub const SIGNATURE_KEY: &str = "signature";

/// Header carrying the API key on signed and key-only endpoints
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Binance API credentials
#[derive(Clone)]
pub struct BinanceCredentials {
    pub api_key: String,
    pub secret_key: String,
}

impl BinanceCredentials {
    /// Create new credentials
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key,
        }
    }

    /// Load credentials from `BINANCE_API_KEY` / `BINANCE_SECRET_KEY`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("BINANCE_API_KEY")
            .map_err(|_| ExchangeError::MissingCredentials("BINANCE_API_KEY".to_string()))?;
        let secret_key = std::env::var("BINANCE_SECRET_KEY")
            .map_err(|_| ExchangeError::MissingCredentials("BINANCE_SECRET_KEY".to_string()))?;

        Ok(Self::new(api_key, secret_key))
    }

    /// Both halves present, no whitespace (a common copy/paste defect)
    pub fn is_valid(&self) -> bool {
        !self.api_key.is_empty()
            && !self.secret_key.is_empty()
            && !self.api_key.chars().any(char::is_whitespace)
            && !self.secret_key.chars().any(char::is_whitespace)
    }

    /// First and last four characters of the API key, for logs
    pub fn api_key_hint(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for BinanceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceCredentials")
            .field("api_key", &self.api_key_hint())
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Scalar value of a request parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Decimal(Fixed),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => write!(f, "{s}"),
            ParamValue::Integer(n) => write!(f, "{n}"),
            ParamValue::Unsigned(n) => write!(f, "{n}"),
            ParamValue::Decimal(d) => write!(f, "{d}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Unsigned(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Unsigned(value as u64)
    }
}

impl From<Fixed> for ParamValue {
    fn from(value: Fixed) -> Self {
        ParamValue::Decimal(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl TryFrom<&serde_json::Value> for ParamValue {
    type Error = ExchangeError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(ParamValue::Text(s.clone())),
            Value::Bool(b) => Ok(ParamValue::Bool(*b)),
            Value::Number(n) => Ok(n
                .as_i64()
                .map(ParamValue::Integer)
                .or_else(|| n.as_u64().map(ParamValue::Unsigned))
                .unwrap_or_else(|| ParamValue::Text(n.to_string()))),
            other => Err(ExchangeError::InvalidInput(format!(
                "parameter values must be scalars, got {other}"
            ))),
        }
    }
}

/// Request parameters, kept sorted by key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: BTreeMap<String, ParamValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Build parameters from a JSON object of scalar values
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            ExchangeError::InvalidInput("parameters must be a JSON object".to_string())
        })?;

        let mut params = Self::new();
        for (key, value) in object {
            params.insert(key.clone(), ParamValue::try_from(value)?);
        }
        Ok(params)
    }

    /// `key1=value1&key2=value2...` with keys in ascending byte order
    ///
    /// This is the signed payload. Values appear exactly as given.
    pub fn canonical(&self) -> String {
        self.join(|part| part.to_string())
    }

    /// The canonical string with keys and values percent-encoded, for URLs
    ///
    /// Identical to [`canonical`](Self::canonical) for symbols, numbers and
    /// the other plain values Binance takes.
    pub fn query_string(&self) -> String {
        self.join(|part| urlencoding::encode(part).into_owned())
    }

    fn join(&self, encode: impl Fn(&str) -> String) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(&v.to_string())))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// HMAC-SHA256 request signer
#[derive(Clone)]
pub struct RequestSigner {
    secret: Vec<u8>,
}

impl RequestSigner {
    /// Create a signer for an API secret
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ExchangeError::InvalidCredentials);
        }
        Ok(Self { secret: secret.to_vec() })
    }

    /// Signature over the canonical serialization of `params`
    pub fn sign(&self, params: &QueryParams) -> Result<String> {
        if params.is_empty() {
            return Err(ExchangeError::InvalidInput("no parameters to sign".to_string()));
        }
        if params.contains_key(SIGNATURE_KEY) {
            return Err(ExchangeError::InvalidInput(
                "parameters already contain a signature".to_string(),
            ));
        }

        self.create_signature(&params.canonical())
    }

    /// URL query string with the signature appended last
    pub fn signed_query(&self, params: &QueryParams) -> Result<String> {
        let signature = self.sign(params)?;
        Ok(format!("{}&{SIGNATURE_KEY}={signature}", params.query_string()))
    }

    /// Check a signature against an arbitrary payload
    pub fn verify(&self, payload: &str, signature: &str) -> bool {
        match self.create_signature(payload) {
            Ok(expected) => expected.eq_ignore_ascii_case(signature),
            Err(_) => false,
        }
    }

    fn create_signature(&self, payload: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| ExchangeError::SigningError(format!("HMAC setup failed: {e}")))?;

        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestSigner { secret: <redacted> }")
    }
}

/// Sign `params` with `secret` in one call
pub fn sign(params: &QueryParams, secret: &[u8]) -> Result<String> {
    RequestSigner::new(secret)?.sign(params)
}
