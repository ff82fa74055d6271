//! Blocking REST API client for the Kraken spot exchange
//!
//! This crate builds and signs requests for Kraken's public and private
//! REST endpoints and decodes the JSON responses into typed values.
//!
//! # Features
//!
//! - **Market Data**: Server time, system status, assets, asset pairs,
//!   ticker, OHLC, order book, recent trades and spreads
//! - **Account**: Balances, trade balance, open/closed orders, order lookup
//!
//! # Authentication
//!
//! Private endpoints require API credentials. Each private request carries a
//! millisecond nonce and an HMAC-SHA512 signature, see [`kraken_auth`].
//!
//! # Example
//!
//! ```no_run
//! use kraken_rest::{AssetPair, Credentials, KrakenRestClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Public endpoints (no auth required)
//!     let client = KrakenRestClient::new()?;
//!     for (pair, ticker) in client.get_ticker(&[AssetPair::XBTUSD])? {
//!         println!("{}: {:?}", pair, ticker.map(|t| t.last_trade.price));
//!     }
//!
//!     // Private endpoints (auth required)
//!     let creds = Credentials::from_env()?;
//!     let auth_client = KrakenRestClient::with_credentials(creds)?;
//!     let balance = auth_client.get_balance()?;
//!     println!("Balances: {:?}", balance.non_zero());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom transports
//!
//! [`KrakenRestClient::with_transport`] accepts any [`Transport`]; the
//! default is a blocking `reqwest` client.

pub mod client;
pub mod decode;
pub mod endpoints;
pub mod error;
pub mod payload;
pub mod request;
pub mod transport;
pub mod types;

// Re-export main types
pub use client::{ClientConfig, KrakenRestClient};
pub use decode::{decode, DecodeOptions, FromResult, TimestampScale};
pub use error::{DecodeError, RestError, RestResult};
pub use kraken_auth::Credentials;
pub use kraken_types::{Asset, AssetPair};
pub use payload::Payload;
pub use request::{RequestBuilder, Visibility};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

// Re-export endpoint-specific types
pub use endpoints::account::{ClosedOrders, ClosedOrdersRequest, OpenOrders, TradeBalance};
pub use endpoints::market::{
    AssetInfo, OhlcSeries, PairSeries, RecentSpreads, RecentTrades, ServerTime, SystemStatus,
};
pub use types::{
    AccountBalance, AssetPairInfo, Fee, LastTrade, OhlcData, Order, OrderBook, OrderBookEntry,
    OrderDescription, Quote, SpreadData, TickerInfo, TickerResults, TradeData, Window,
};
