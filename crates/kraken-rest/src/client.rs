//! Main REST client implementation

use chrono::{DateTime, Utc};
use kraken_auth::Credentials;
use kraken_types::{Asset, AssetPair, OhlcInterval};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::decode::{decode, DecodeOptions, FromResult, TimestampScale};
use crate::endpoints::account::{ClosedOrders, ClosedOrdersRequest, OpenOrders, TradeBalance};
use crate::endpoints::market::{OhlcSeries, RecentSpreads, RecentTrades, ServerTime, SystemStatus};
use crate::endpoints::{AccountEndpoints, MarketEndpoints};
use crate::error::{RestError, RestResult};
use crate::payload::Payload;
use crate::request::{RequestBuilder, Visibility};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{AccountBalance, Order, OrderBook, TickerResults};

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";
/// API version path segment
pub const DEFAULT_API_VERSION: &str = "0";
/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("kraken-rest/", env!("CARGO_PKG_VERSION"));

/// Kraken REST API client
///
/// Every call blocks the current thread for at most one round trip. The
/// client is cheap to clone and can be shared across threads.
///
/// # Example
///
/// ```no_run
/// use kraken_rest::{KrakenRestClient, Credentials, AssetPair};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = KrakenRestClient::new()?;
///     let ticker = client.get_ticker(&[AssetPair::XBTUSD])?;
///
///     // With authentication for private endpoints
///     let creds = Credentials::from_env()?;
///     let auth_client = KrakenRestClient::with_credentials(creds)?;
///     let balance = auth_client.get_balance()?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct KrakenRestClient {
    requests: RequestBuilder,
    transport: Arc<dyn Transport>,
    options: DecodeOptions,
}

impl KrakenRestClient {
    /// Create a new client without authentication
    ///
    /// Only public endpoints will be available.
    pub fn new() -> RestResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with credentials
    ///
    /// All endpoints (public and private) will be available.
    pub fn with_credentials(credentials: Credentials) -> RestResult<Self> {
        Self::with_config(ClientConfig::default().with_credentials(credentials))
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let transport = ReqwestTransport::new(
            Duration::from_secs(config.timeout_secs),
            config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
        )?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client that sends requests through the given transport
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        info!(base_url = %config.base_url, authenticated = config.credentials.is_some(), "Created Kraken REST client");

        Self {
            requests: RequestBuilder::new(config.base_url, config.api_version, config.credentials),
            transport: Arc::new(transport),
            options: DecodeOptions::default().with_timestamp_scale(config.timestamp_scale),
        }
    }

    /// Check if the client has credentials for private endpoints
    pub fn has_credentials(&self) -> bool {
        self.requests.has_credentials()
    }

    /// Request builder used by this client
    pub fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    /// Build, send and decode one request
    pub(crate) fn call<T: FromResult>(
        &self,
        endpoint: &str,
        visibility: Visibility,
        payload: Payload,
    ) -> RestResult<T> {
        let request = self.requests.build(endpoint, visibility, payload)?;
        debug!(url = %request.url, "Sending request");

        let response = self.transport.send(&request)?;
        decode(response.status, response.body.as_deref(), &self.options)
    }

    // ========================================================================
    // Public Market Endpoints
    // ========================================================================

    /// Get market endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(self)
    }

    /// Get server time
    pub fn get_server_time(&self) -> RestResult<ServerTime> {
        self.market().get_server_time()
    }

    /// Get system status
    pub fn get_system_status(&self) -> RestResult<SystemStatus> {
        self.market().get_system_status()
    }

    /// Get ticker information for trading pairs
    pub fn get_ticker(&self, pairs: &[AssetPair]) -> RestResult<TickerResults> {
        self.market().get_ticker(pairs)
    }

    /// Get OHLC candles for a trading pair
    pub fn get_ohlc(
        &self,
        pair: &AssetPair,
        interval: Option<OhlcInterval>,
        since: Option<DateTime<Utc>>,
    ) -> RestResult<OhlcSeries> {
        self.market().get_ohlc(pair, interval, since)
    }

    /// Get orderbook depth for a trading pair
    ///
    /// # Arguments
    /// * `pair` - Trading pair
    /// * `count` - Number of price levels (1-500)
    pub fn get_order_book(
        &self,
        pair: &AssetPair,
        count: Option<u32>,
    ) -> RestResult<HashMap<String, OrderBook>> {
        self.market().get_order_book(pair, count)
    }

    /// Get recent trades for a trading pair
    pub fn get_recent_trades(
        &self,
        pair: &AssetPair,
        since: Option<DateTime<Utc>>,
        count: Option<u32>,
    ) -> RestResult<RecentTrades> {
        self.market().get_recent_trades(pair, since, count)
    }

    /// Get recent spreads for a trading pair
    pub fn get_recent_spreads(
        &self,
        pair: &AssetPair,
        since: Option<DateTime<Utc>>,
    ) -> RestResult<RecentSpreads> {
        self.market().get_recent_spreads(pair, since)
    }

    // ========================================================================
    // Private Account Endpoints
    // ========================================================================

    /// Get account endpoints (requires credentials)
    pub fn account(&self) -> RestResult<AccountEndpoints<'_>> {
        if !self.has_credentials() {
            return Err(RestError::Configuration(
                "credentials required for private endpoint".to_string(),
            ));
        }
        Ok(AccountEndpoints::new(self))
    }

    /// Get account balance
    pub fn get_balance(&self) -> RestResult<AccountBalance> {
        self.account()?.get_balance()
    }

    /// Get trade balance
    pub fn get_trade_balance(&self, asset: Option<&Asset>) -> RestResult<TradeBalance> {
        self.account()?.get_trade_balance(asset)
    }

    /// Get open orders
    pub fn get_open_orders(&self) -> RestResult<OpenOrders> {
        self.account()?.get_open_orders(None, None)
    }

    /// Get closed orders
    pub fn get_closed_orders(&self, request: &ClosedOrdersRequest) -> RestResult<ClosedOrders> {
        self.account()?.get_closed_orders(request)
    }

    /// Query orders by transaction id
    pub fn query_orders(&self, txids: &[String]) -> RestResult<HashMap<String, Order>> {
        self.account()?.query_orders(txids, None, None)
    }
}

impl std::fmt::Debug for KrakenRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenRestClient")
            .field("requests", &self.requests)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials (optional)
    pub credentials: Option<Credentials>,
    /// Scheme and host, without a trailing path
    pub base_url: String,
    /// Version path segment
    pub api_version: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Custom user agent
    pub user_agent: Option<String>,
    /// How fractional timestamps are read
    pub timestamp_scale: TimestampScale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            timestamp_scale: TimestampScale::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set API version
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set timestamp scale
    pub fn with_timestamp_scale(mut self, scale: TimestampScale) -> Self {
        self.timestamp_scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.kraken.com");
        assert_eq!(config.api_version, "0");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.timestamp_scale, TimestampScale::TenThousand);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new()
            .with_base_url("http://localhost:9000")
            .with_api_version("1")
            .with_timeout(5)
            .with_user_agent("test-agent")
            .with_timestamp_scale(TimestampScale::Microseconds)
            .with_credentials(Credentials::new("key", "c2VjcmV0"));

        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.api_version, "1");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent.as_deref(), Some("test-agent"));
        assert_eq!(config.timestamp_scale, TimestampScale::Microseconds);
        assert!(config.credentials.is_some());
    }

    #[test]
    fn test_client_without_credentials() {
        let client = KrakenRestClient::new().unwrap();
        assert!(!client.has_credentials());
        assert!(matches!(client.account(), Err(RestError::Configuration(_))));
    }
}
