//! Public market data endpoints
//!
//! These endpoints don't require authentication.

use chrono::{DateTime, Utc};
use kraken_types::{Asset, AssetClass, AssetPair, OhlcInterval, PairInformation, SystemState};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::client::KrakenRestClient;
use crate::decode::{
    collect_decoded, decode_keyed, decode_rows, from_serde, object, unix_nanos, unix_seconds,
    DecodeOptions, FromResult,
};
use crate::error::{DecodeError, RestError, RestResult};
use crate::payload::Payload;
use crate::request::Visibility;
use crate::types::{AssetPairInfo, OhlcData, OrderBook, SpreadData, TickerResults, TradeData};

/// Server time
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerTime {
    /// Unix timestamp
    pub unixtime: i64,
    /// RFC 1123 time format
    pub rfc1123: String,
}

impl ServerTime {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.unixtime, 0)
    }
}

impl FromResult for ServerTime {
    fn from_result(result: &Value, _options: &DecodeOptions) -> Result<Self, DecodeError> {
        from_serde(result)
    }
}

/// System status
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    pub status: SystemState,
    /// RFC 3339 timestamp of the status
    pub timestamp: String,
}

impl FromResult for SystemStatus {
    fn from_result(result: &Value, _options: &DecodeOptions) -> Result<Self, DecodeError> {
        from_serde(result)
    }
}

/// Asset info
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetInfo {
    pub aclass: String,
    pub altname: String,
    pub decimals: u32,
    pub display_decimals: u32,
    pub collateral_value: Option<rust_decimal::Decimal>,
    pub status: Option<String>,
}

impl FromResult for HashMap<String, AssetInfo> {
    fn from_result(result: &Value, _options: &DecodeOptions) -> Result<Self, DecodeError> {
        let assets = object(result, "result")?;
        Ok(collect_decoded(decode_keyed(assets, |_, value| from_serde(value)), "assets"))
    }
}

/// Rows keyed by pair, plus the cursor for the next page
///
/// Pass `last` as `since` on the next call to continue where this page ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairSeries<T> {
    pub data: HashMap<String, Vec<T>>,
    pub last: DateTime<Utc>,
}

impl<T> PairSeries<T> {
    /// Rows for one pair
    pub fn get(&self, pair: &str) -> &[T] {
        self.data.get(pair).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All rows across pairs
    pub fn rows(&self) -> impl Iterator<Item = &T> {
        self.data.values().flatten()
    }

    fn decode<R, L>(result: &Value, context: &str, mut decode_row: R, decode_last: L) -> Result<Self, DecodeError>
    where
        R: FnMut(&Value) -> Result<T, DecodeError>,
        L: Fn(&Value, &str) -> Result<DateTime<Utc>, DecodeError>,
    {
        let map = object(result, "result")?;
        let mut series = Self {
            data: HashMap::new(),
            last: DateTime::default(),
        };

        for (key, value) in map {
            if key == "last" {
                match decode_last(value, "last") {
                    Ok(last) => series.last = last,
                    Err(err) => debug!(context, error = %err, "Ignoring pagination cursor"),
                }
            } else if let Some(rows) = value.as_array() {
                series
                    .data
                    .insert(key.clone(), decode_rows(rows, context, &mut decode_row));
            }
        }
        Ok(series)
    }
}

/// OHLC candles, `last` in whole seconds
pub type OhlcSeries = PairSeries<OhlcData>;
/// Recent trades, `last` from a nanosecond cursor
pub type RecentTrades = PairSeries<TradeData>;
/// Recent spreads, `last` in whole seconds
pub type RecentSpreads = PairSeries<SpreadData>;

impl FromResult for OhlcSeries {
    fn from_result(result: &Value, _options: &DecodeOptions) -> Result<Self, DecodeError> {
        Self::decode(result, "ohlc", OhlcData::decode_row, unix_seconds)
    }
}

impl FromResult for RecentTrades {
    fn from_result(result: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        Self::decode(result, "trades", |row| TradeData::decode_row(row, options), unix_nanos)
    }
}

impl FromResult for RecentSpreads {
    fn from_result(result: &Value, _options: &DecodeOptions) -> Result<Self, DecodeError> {
        Self::decode(result, "spread", SpreadData::decode_row, unix_seconds)
    }
}

fn require_pair(pair: &AssetPair) -> RestResult<()> {
    if pair.is_empty() {
        return Err(RestError::InvalidParameter("pair is required".to_string()));
    }
    Ok(())
}

/// Public market data endpoints
pub struct MarketEndpoints<'a> {
    client: &'a KrakenRestClient,
}

impl<'a> MarketEndpoints<'a> {
    pub fn new(client: &'a KrakenRestClient) -> Self {
        Self { client }
    }

    fn call<T: FromResult>(&self, endpoint: &str, payload: Payload) -> RestResult<T> {
        self.client.call(endpoint, Visibility::Public, payload)
    }

    /// Get server time
    #[instrument(skip(self))]
    pub fn get_server_time(&self) -> RestResult<ServerTime> {
        debug!("Fetching server time");
        self.call("Time", Payload::new())
    }

    /// Get system status
    #[instrument(skip(self))]
    pub fn get_system_status(&self) -> RestResult<SystemStatus> {
        debug!("Fetching system status");
        self.call("SystemStatus", Payload::new())
    }

    /// Get asset info
    ///
    /// # Arguments
    /// * `assets` - Assets to get info for; empty for all
    /// * `asset_class` - Asset class filter
    #[instrument(skip(self))]
    pub fn get_assets(
        &self,
        assets: &[Asset],
        asset_class: Option<AssetClass>,
    ) -> RestResult<HashMap<String, AssetInfo>> {
        let mut payload = Payload::new();
        payload.set_assets(assets);
        if let Some(asset_class) = asset_class {
            payload.set_asset_class(asset_class);
        }

        debug!("Fetching asset info");
        self.call("Assets", payload)
    }

    /// Get tradable asset pairs
    ///
    /// # Arguments
    /// * `pairs` - Pairs to get info for; empty for all
    /// * `info` - Which slice of pair information to return
    #[instrument(skip(self))]
    pub fn get_asset_pairs(
        &self,
        pairs: &[AssetPair],
        info: Option<PairInformation>,
    ) -> RestResult<HashMap<String, AssetPairInfo>> {
        let mut payload = Payload::new();
        payload.set_pairs(pairs);
        if let Some(info) = info {
            payload.set_information(info);
        }

        debug!("Fetching asset pairs");
        self.call("AssetPairs", payload)
    }

    /// Get ticker information
    ///
    /// Each pair decodes on its own; a malformed entry shows up as an `Err`
    /// for that pair only.
    #[instrument(skip(self))]
    pub fn get_ticker(&self, pairs: &[AssetPair]) -> RestResult<TickerResults> {
        let mut payload = Payload::new();
        payload.set_pairs(pairs);

        debug!("Fetching ticker for {} pairs", pairs.len());
        self.call("Ticker", payload)
    }

    /// Get OHLC candles
    ///
    /// # Arguments
    /// * `pair` - Trading pair (e.g., "XBTUSD")
    /// * `interval` - Candle length, defaults to one minute server side
    /// * `since` - Return candles after this time
    #[instrument(skip(self))]
    pub fn get_ohlc(
        &self,
        pair: &AssetPair,
        interval: Option<OhlcInterval>,
        since: Option<DateTime<Utc>>,
    ) -> RestResult<OhlcSeries> {
        require_pair(pair)?;
        let mut payload = Payload::new();
        payload.set_pairs(std::slice::from_ref(pair));
        if let Some(interval) = interval {
            payload.set_interval(interval);
        }
        if let Some(since) = since {
            payload.set_since(since);
        }

        debug!("Fetching OHLC for {}", pair);
        self.call("OHLC", payload)
    }

    /// Get orderbook depth
    ///
    /// # Arguments
    /// * `pair` - Trading pair (e.g., "XBTUSD")
    /// * `count` - Maximum number of asks/bids (1-500, default 100)
    #[instrument(skip(self))]
    pub fn get_order_book(
        &self,
        pair: &AssetPair,
        count: Option<u32>,
    ) -> RestResult<HashMap<String, OrderBook>> {
        require_pair(pair)?;
        let mut payload = Payload::new();
        payload.set_pairs(std::slice::from_ref(pair));
        if let Some(count) = count {
            payload.set_count(count);
        }

        debug!("Fetching orderbook for {}", pair);
        self.call("Depth", payload)
    }

    /// Get recent trades
    #[instrument(skip(self))]
    pub fn get_recent_trades(
        &self,
        pair: &AssetPair,
        since: Option<DateTime<Utc>>,
        count: Option<u32>,
    ) -> RestResult<RecentTrades> {
        require_pair(pair)?;
        let mut payload = Payload::new();
        payload.set_pairs(std::slice::from_ref(pair));
        if let Some(since) = since {
            payload.set_since(since);
        }
        if let Some(count) = count {
            payload.set_count(count);
        }

        debug!("Fetching recent trades for {}", pair);
        self.call("Trades", payload)
    }

    /// Get recent spreads
    #[instrument(skip(self))]
    pub fn get_recent_spreads(
        &self,
        pair: &AssetPair,
        since: Option<DateTime<Utc>>,
    ) -> RestResult<RecentSpreads> {
        require_pair(pair)?;
        let mut payload = Payload::new();
        payload.set_pairs(std::slice::from_ref(pair));
        if let Some(since) = since {
            payload.set_since(since);
        }

        debug!("Fetching recent spreads for {}", pair);
        self.call("Spread", payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_server_time_deserialize() {
        let result = json!({"unixtime": 1688669448, "rfc1123": "Thu, 06 Jul 23 18:50:48 +0000"});
        let time = ServerTime::from_result(&result, &DecodeOptions::default()).unwrap();
        assert_eq!(time.unixtime, 1688669448);
        assert_eq!(time.time().map(|t| t.timestamp()), Some(1688669448));
    }

    #[test]
    fn test_system_status_unknown_state() {
        let result = json!({"status": "degraded", "timestamp": "2023-07-06T18:52:00Z"});
        let status = SystemStatus::from_result(&result, &DecodeOptions::default()).unwrap();
        assert_eq!(status.status, SystemState::Unknown);
    }

    #[test]
    fn test_ohlc_skips_bad_row() {
        let result = json!({
            "XXBTZUSD": [
                [1688671200, "30306.1", "30306.2", "30305.7", "30305.7", "30306.1", "3.39243896", 23],
                [1688671260, "30305.7", "not-a-number", "30305.7", "30305.7", "0.0", "0.0", 0],
                [1688671320, "30305.7", "30305.8", "30305.6", "30305.8", "30305.7", "1.5", 4]
            ],
            "last": 1688672160
        });

        let series = OhlcSeries::from_result(&result, &DecodeOptions::default()).unwrap();
        let candles = series.get("XXBTZUSD");
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time.timestamp(), 1688671200);
        assert_eq!(candles[1].time.timestamp(), 1688671320);
        assert_eq!(series.last.timestamp(), 1688672160);
        assert_eq!(series.rows().count(), 2);
    }

    #[test]
    fn test_trades_nanosecond_cursor() {
        let result = json!({
            "XXBTZUSD": [
                ["30243.40000", "0.34507674", 1688669597.8277369, "b", "m", "", 61044952],
                ["30243.30000", "0.00100000", 1688669597.9070270, "s", "l", "", 61044953]
            ],
            "last": "1688671969993150842"
        });

        let trades = RecentTrades::from_result(&result, &DecodeOptions::default()).unwrap();
        assert_eq!(trades.get("XXBTZUSD").len(), 2);
        assert_eq!(trades.last.timestamp(), 1688671969);
        assert_eq!(trades.last.nanosecond(), 993_150_842);
    }

    #[test]
    fn test_unreadable_cursor_keeps_rows() {
        let result = json!({
            "XXBTZUSD": [
                ["30243.40000", "0.34507674", 1688669597.8277, "b", "m", "", 61044952]
            ],
            "last": "not-a-cursor"
        });

        let trades = RecentTrades::from_result(&result, &DecodeOptions::default()).unwrap();
        let rows = trades.get("XXBTZUSD");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, dec!(30243.4));
        assert_eq!(trades.last, DateTime::<Utc>::default());
    }

    #[test]
    fn test_spreads() {
        let result = json!({
            "XXBTZUSD": [[1688671834, "30292.10000", "30297.50000"], [1688671834]],
            "last": 1688672106
        });

        let spreads = RecentSpreads::from_result(&result, &DecodeOptions::default()).unwrap();
        let rows = spreads.get("XXBTZUSD");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bid, dec!(30292.1));
        assert_eq!(rows[0].ask, dec!(30297.5));
        assert!(spreads.get("XETHZUSD").is_empty());
    }

    #[test]
    fn test_series_without_last() {
        let series = OhlcSeries::from_result(&json!({}), &DecodeOptions::default()).unwrap();
        assert!(series.data.is_empty());
        assert_eq!(series.last.timestamp(), 0);
    }

    #[test]
    fn test_assets_keyed() {
        let result = json!({
            "XXBT": {"aclass": "currency", "altname": "XBT", "decimals": 10, "display_decimals": 5, "status": "enabled"},
            "ZUSD": {"aclass": "currency", "altname": "USD", "decimals": "four"}
        });

        let assets = HashMap::<String, AssetInfo>::from_result(&result, &DecodeOptions::default()).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets["XXBT"].altname, "XBT");
        assert_eq!(assets["XXBT"].decimals, 10);
    }
}
