//! Binance spot REST client on monoio
//!
//! Market data calls are plain GETs. Account and order calls are signed:
//! a fresh `timestamp` and `recvWindow` are added to the parameters right
//! before signing, the signature goes last, and the API key travels in the
//! `X-MBX-APIKEY` header. Nothing is retried here; the caller's loop is the
//! retry cadence.

use crate::binance::auth::{API_KEY_HEADER, BinanceCredentials, QueryParams, RequestSigner};
use crate::errors::{ExchangeError, Result, classify_error};
use crate::http::MonoioHttpsClient;
use crate::traits::{ExchangeClient, PriceFeed};
use crate::types::{FillSummary, Kline, LotSize, OrderSide, OrderType};
use pricewatch_core::log_trade;
use pricewatch_core::prelude::*;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Decimal places order quantities are truncated to unless configured otherwise
pub const DEFAULT_QUANTITY_PRECISION: u32 = 3;

/// Binance exchange configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinanceConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub testnet: bool,
    pub timeout_ms: u64,
    pub recv_window_ms: u64,
    /// Decimal places order quantities are truncated to before submission
    pub quantity_precision: u32,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: "https://api.binance.com".to_string(),
            testnet: false,
            timeout_ms: 10_000,
            recv_window_ms: 5_000,
            quantity_precision: DEFAULT_QUANTITY_PRECISION,
        }
    }
}

impl BinanceConfig {
    pub fn testnet() -> Self {
        Self {
            base_url: "https://testnet.binance.vision".to_string(),
            testnet: true,
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, api_key: String, api_secret: String) -> Self {
        self.api_key = api_key;
        self.api_secret = api_secret;
        self
    }

    pub fn with_env_credentials(self) -> Result<Self> {
        let creds = BinanceCredentials::from_env()?;
        Ok(self.with_credentials(creds.api_key, creds.secret_key))
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Use the precision implied by a symbol's `LOT_SIZE` step instead of the default
    pub fn with_quantity_precision(mut self, precision: u32) -> Self {
        self.quantity_precision = precision;
        self
    }

    /// Credentials if configured; half-configured credentials are an error
    pub fn credentials(&self) -> Result<Option<BinanceCredentials>> {
        match (self.api_key.is_empty(), self.api_secret.is_empty()) {
            (true, true) => Ok(None),
            (false, true) => Err(ExchangeError::MissingCredentials("api_secret".to_string())),
            (true, false) => Err(ExchangeError::MissingCredentials("api_key".to_string())),
            (false, false) => {
                let creds = BinanceCredentials::new(self.api_key.clone(), self.api_secret.clone());
                if creds.is_valid() {
                    Ok(Some(creds))
                } else {
                    Err(ExchangeError::InvalidCredentials)
                }
            }
        }
    }
}

/// `/api/v3/exchangeInfo` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInfo {
    pub timezone: String,
    #[serde(rename = "serverTime")]
    pub server_time: u64,
    pub symbols: Vec<SymbolInfo>,
}

/// Symbol information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    #[serde(rename = "baseAsset")]
    pub base_asset: String,
    #[serde(rename = "quoteAsset")]
    pub quote_asset: String,
    pub filters: Vec<Value>,
}

impl ExchangeInfo {
    fn symbol(&self, symbol: &str) -> Result<&SymbolInfo> {
        self.symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| ExchangeError::NotFound(format!("symbol {symbol}")))
    }
}

impl SymbolInfo {
    fn filter(&self, filter_types: &[&str]) -> Option<&Value> {
        self.filters.iter().find(|f| {
            f["filterType"]
                .as_str()
                .is_some_and(|t| filter_types.contains(&t))
        })
    }

    /// `LOT_SIZE` filter
    pub fn lot_size(&self) -> Result<LotSize> {
        let filter = self.filter(&["LOT_SIZE"]).ok_or_else(|| {
            ExchangeError::NotFound(format!("LOT_SIZE filter for {}", self.symbol))
        })?;

        Ok(LotSize {
            min_qty: decimal_field(filter, "minQty")?,
            max_qty: decimal_field(filter, "maxQty")?,
            step_size: decimal_field(filter, "stepSize")?,
        })
    }

    /// `NOTIONAL` filter, falling back to the legacy `MIN_NOTIONAL`
    pub fn min_notional(&self) -> Result<Fixed> {
        let filter = self.filter(&["NOTIONAL", "MIN_NOTIONAL"]).ok_or_else(|| {
            ExchangeError::NotFound(format!("NOTIONAL filter for {}", self.symbol))
        })?;

        match filter.get("minNotional") {
            Some(_) => decimal_field(filter, "minNotional"),
            None => Ok(Fixed::ZERO),
        }
    }
}

/// Binance spot REST client
pub struct BinanceRestClient {
    config: BinanceConfig,
    base_url: Url,
    https_client: MonoioHttpsClient,
    credentials: Option<BinanceCredentials>,
    signer: Option<RequestSigner>,
}

impl BinanceRestClient {
    /// Create a client; fails on a bad base URL or malformed credentials
    pub fn new(config: BinanceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let credentials = config.credentials()?;
        let signer = credentials
            .as_ref()
            .map(|c| RequestSigner::new(&c.secret_key))
            .transpose()?;

        let https_client = MonoioHttpsClient::new(Duration::from_millis(config.timeout_ms))?;

        info!("🔗 Binance REST client created");
        info!("   Base URL: {}", base_url);
        info!("   Testnet: {}", config.testnet);
        match &credentials {
            Some(c) => info!("   API key: {}", c.api_key_hint()),
            None => info!("   API key: none (market data only)"),
        }

        Ok(Self {
            config,
            base_url,
            https_client,
            credentials,
            signer,
        })
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    /// Whether signed endpoints can be called
    pub fn is_authenticated(&self) -> bool {
        self.signer.is_some()
    }

    /// Test connectivity (ping endpoint)
    pub async fn ping(&self) -> Result<()> {
        self.get_request("/api/v3/ping", &QueryParams::new()).await?;
        Ok(())
    }

    /// Server time in milliseconds
    pub async fn server_time(&self) -> Result<u64> {
        let response = self.get_request("/api/v3/time", &QueryParams::new()).await?;

        response["serverTime"]
            .as_u64()
            .ok_or_else(|| ExchangeError::InvalidResponse("Missing serverTime".to_string()))
    }

    /// Latest traded price of `symbol`
    pub async fn get_current_price(&self, symbol: &str) -> Result<Fixed> {
        let params = QueryParams::new().with("symbol", symbol);
        let response = self.get_request("/api/v3/ticker/price", &params).await?;
        parse_price(&response, symbol)
    }

    /// Free balance of every asset on the account
    pub async fn get_account_balances(&self) -> Result<BTreeMap<String, Fixed>> {
        let response = self.signed_request("GET", "/api/v3/account", QueryParams::new()).await?;
        parse_balances(&response)
    }

    /// Submit an order and summarise its fills
    ///
    /// The quantity is truncated toward zero to `quantity_precision` decimal
    /// places so the order never asks for more than the caller holds.
    pub async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Fixed,
        order_type: OrderType,
    ) -> Result<FillSummary> {
        let quantity = truncate_quantity(quantity, self.config.quantity_precision)?;

        let mut params = QueryParams::new()
            .with("symbol", symbol)
            .with("side", side.to_string())
            .with("type", order_type.to_string())
            .with("quantity", quantity)
            .with("newOrderRespType", "FULL")
            .with("newClientOrderId", generate_client_order_id());

        if let OrderType::Limit { price } = order_type {
            params.insert("price", price.normalize());
            params.insert("timeInForce", "GTC");
        }

        let response = self.signed_request("POST", "/api/v3/order", params).await?;
        let fill = parse_fill_summary(&response)?;

        log_trade!(side, symbol, fill.quantity, fill.price);
        Ok(fill)
    }

    /// Market BUY worth `quote_amount` of the quote asset (e.g. USDT)
    pub async fn place_quote_order(&self, symbol: &str, quote_amount: Fixed) -> Result<FillSummary> {
        let price = self.get_current_price(symbol).await?;
        let quantity = quote_amount.checked_div(price)?;
        debug!("💱 {} {} at {} is {} base units", quote_amount, symbol, price, quantity);

        self.place_order(symbol, OrderSide::Buy, quantity, OrderType::Market).await
    }

    /// Exchange metadata for a single symbol
    pub async fn exchange_info(&self, symbol: &str) -> Result<ExchangeInfo> {
        let params = QueryParams::new().with("symbol", symbol);
        let response = self.get_request("/api/v3/exchangeInfo", &params).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// `LOT_SIZE` constraints of `symbol`
    pub async fn get_lot_size_constraints(&self, symbol: &str) -> Result<LotSize> {
        self.exchange_info(symbol).await?.symbol(symbol)?.lot_size()
    }

    /// Minimum order value of `symbol` in its quote asset
    pub async fn get_min_notional(&self, symbol: &str) -> Result<Fixed> {
        self.exchange_info(symbol).await?.symbol(symbol)?.min_notional()
    }

    /// Historical candles, oldest first
    pub async fn get_klines(&self, symbol: &str, interval: &str, limit: Option<u32>) -> Result<Vec<Kline>> {
        let mut params = QueryParams::new()
            .with("symbol", symbol)
            .with("interval", interval);
        if let Some(limit) = limit {
            params.insert("limit", limit);
        }

        let response = self.get_request("/api/v3/klines", &params).await?;
        parse_klines(&response)
    }

    async fn get_request(&self, endpoint: &str, params: &QueryParams) -> Result<Value> {
        let _timer = PerfTimer::start(format!("binance_get_{endpoint}"));

        let mut url = self.base_url.clone();
        url.set_path(endpoint);
        if !params.is_empty() {
            url.set_query(Some(&params.query_string()));
        }

        debug!("📡 GET {}", url);
        let body = self.execute("GET", url.as_str(), &[]).await?;

        serde_json::from_str(&body)
            .map_err(|e| ExchangeError::SerializationError(format!("{e}: {body}")))
    }

    async fn signed_request(&self, method: &str, endpoint: &str, params: QueryParams) -> Result<Value> {
        let _timer = PerfTimer::start(format!("binance_signed_{endpoint}"));

        let (url, headers) = self.signed_url(endpoint, params)?;

        debug!("📡 {} {} (signed)", method, endpoint);
        let body = self.execute(method, url.as_str(), &headers).await?;

        serde_json::from_str(&body)
            .map_err(|e| ExchangeError::SerializationError(format!("{e}: {body}")))
    }

    /// URL and API key header of a signed call
    ///
    /// `recvWindow` and a fresh `timestamp` are added on every call, then the
    /// signature is appended as the last query parameter.
    fn signed_url(&self, endpoint: &str, mut params: QueryParams) -> Result<(Url, [(&'static str, &str); 1])> {
        let (Some(signer), Some(credentials)) = (&self.signer, &self.credentials) else {
            return Err(ExchangeError::MissingCredentials(format!(
                "{endpoint} requires an API key and secret"
            )));
        };

        params.insert("recvWindow", self.config.recv_window_ms);
        params.insert("timestamp", timestamp_ms());

        let mut url = self.base_url.clone();
        url.set_path(endpoint);
        url.set_query(Some(&signer.signed_query(&params)?));

        Ok((url, [(API_KEY_HEADER, credentials.api_key.as_str())]))
    }

    async fn execute(&self, method: &str, url: &str, headers: &[(&str, &str)]) -> Result<String> {
        let response = self.https_client.request_with_headers(method, url, None, headers).await?;

        if !response.is_success() {
            let err = classify_error(response.status, &response.body);
            if err.is_auth() {
                warn!("🔐 Credentials rejected by Binance: {}", err);
            }
            return Err(err);
        }

        Ok(response.body)
    }
}

#[async_trait(?Send)]
impl PriceFeed for BinanceRestClient {
    async fn current_price(&self, symbol: &str) -> Result<Fixed> {
        self.get_current_price(symbol).await
    }
}

#[async_trait(?Send)]
impl ExchangeClient for BinanceRestClient {
    async fn account_balances(&self) -> Result<BTreeMap<String, Fixed>> {
        self.get_account_balances().await
    }

    async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Fixed,
        order_type: OrderType,
    ) -> Result<FillSummary> {
        BinanceRestClient::place_order(self, symbol, side, quantity, order_type).await
    }

    async fn lot_size_constraints(&self, symbol: &str) -> Result<LotSize> {
        self.get_lot_size_constraints(symbol).await
    }

    async fn min_notional(&self, symbol: &str) -> Result<Fixed> {
        self.get_min_notional(symbol).await
    }
}

/// Truncate toward zero to `precision` decimals; a zero result is rejected
pub fn truncate_quantity(quantity: Fixed, precision: u32) -> Result<Fixed> {
    let truncated = quantity.trunc_with_scale(precision);
    if !truncated.is_positive() {
        return Err(ExchangeError::InvalidQuantity(format!(
            "{quantity} truncates to {truncated} at {precision} decimal places"
        )));
    }
    Ok(truncated)
}

fn decimal_field(value: &Value, field: &str) -> Result<Fixed> {
    let raw = match &value[field] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(ExchangeError::InvalidResponse(format!("Missing {field}"))),
    };
    Ok(Fixed::from_str_exact(&raw)?)
}

/// Price out of a `/ticker/price` response
pub fn parse_price(response: &Value, symbol: &str) -> Result<Fixed> {
    if response.get("price").is_none() {
        return Err(ExchangeError::PriceUnavailable(format!("no price field for {symbol}")));
    }

    let price = decimal_field(response, "price")
        .map_err(|_| ExchangeError::PriceUnavailable(format!("unparseable price for {symbol}")))?;

    if !price.is_positive() {
        return Err(ExchangeError::PriceUnavailable(format!("non-positive price {price} for {symbol}")));
    }
    Ok(price.normalize())
}

/// Free balances out of an `/account` response
pub fn parse_balances(response: &Value) -> Result<BTreeMap<String, Fixed>> {
    let balances = response["balances"]
        .as_array()
        .ok_or_else(|| ExchangeError::InvalidResponse("Missing balances".to_string()))?;

    balances
        .iter()
        .map(|b| {
            let asset = b["asset"]
                .as_str()
                .ok_or_else(|| ExchangeError::InvalidResponse("Balance without asset".to_string()))?;
            Ok((asset.to_string(), decimal_field(b, "free")?.normalize()))
        })
        .collect()
}

/// Weighted average fill price and total quantity of an order response
pub fn parse_fill_summary(response: &Value) -> Result<FillSummary> {
    let fills = response["fills"].as_array().map(Vec::as_slice).unwrap_or_default();

    if !fills.is_empty() {
        let mut quantity = Fixed::ZERO;
        let mut notional = Fixed::ZERO;
        for fill in fills {
            let price = decimal_field(fill, "price")?;
            let qty = decimal_field(fill, "qty")?;
            quantity += qty;
            notional += price * qty;
        }
        return Ok(FillSummary {
            price: notional.checked_div(quantity)?.normalize(),
            quantity: quantity.normalize(),
        });
    }

    // Resting limit orders report no fills yet.
    let executed = decimal_field(response, "executedQty")?;
    let price = if executed.is_positive() {
        decimal_field(response, "cummulativeQuoteQty")?.checked_div(executed)?
    } else {
        decimal_field(response, "price")?
    };

    Ok(FillSummary {
        price: price.normalize(),
        quantity: executed.normalize(),
    })
}

/// Candles out of a `/klines` response (array of arrays)
pub fn parse_klines(response: &Value) -> Result<Vec<Kline>> {
    let rows = response
        .as_array()
        .ok_or_else(|| ExchangeError::InvalidResponse("klines must be an array".to_string()))?;

    rows.iter()
        .map(|row| {
            let cols = row
                .as_array()
                .filter(|c| c.len() >= 7)
                .ok_or_else(|| ExchangeError::InvalidResponse(format!("malformed kline: {row}")))?;
            let millis = |i: usize| {
                cols[i]
                    .as_u64()
                    .map(Timestamp::from_millis)
                    .ok_or_else(|| ExchangeError::InvalidResponse(format!("bad kline time: {}", cols[i])))
            };
            let decimal = |i: usize| -> Result<Fixed> {
                let raw = cols[i].as_str().ok_or_else(|| {
                    ExchangeError::InvalidResponse(format!("bad kline value: {}", cols[i]))
                })?;
                Ok(Fixed::from_str_exact(raw)?.normalize())
            };

            Ok(Kline {
                open_time: millis(0)?,
                open: decimal(1)?,
                high: decimal(2)?,
                low: decimal(3)?,
                close: decimal(4)?,
                volume: decimal(5)?,
                close_time: millis(6)?,
            })
        })
        .collect()
}
