//! Domain types shared by the REST endpoints

use chrono::{DateTime, Utc};
use kraken_types::{parse_flag_list, OrderFlag, OrderMisc, OrderStatus, OrderType, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

use crate::decode::{
    array, collect_decoded, decimal, decode_keyed, decode_rows, fractional_timestamp, from_serde,
    integer, object, string, tuple, unix_seconds, DecodeOptions, Fields, FromResult,
};
use crate::error::DecodeError;

// ============================================================================
// Ticker
// ============================================================================

/// Best ask or bid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quote {
    pub price: Decimal,
    pub whole_lot_volume: Decimal,
    pub lot_volume: Decimal,
}

/// Last trade closed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastTrade {
    pub price: Decimal,
    pub lot_volume: Decimal,
}

/// A value for today and for the rolling last 24 hours
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window<T> {
    pub today: T,
    pub last_24_hours: T,
}

/// Ticker information for one pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerInfo {
    /// Ask `a`
    pub ask: Quote,
    /// Bid `b`
    pub bid: Quote,
    /// Last trade closed `c`
    pub last_trade: LastTrade,
    /// Volume `v`
    pub volume: Window<Decimal>,
    /// Volume weighted average price `p`
    pub vwap: Window<Decimal>,
    /// Number of trades `t`
    pub trades: Window<i64>,
    /// Low `l`
    pub low: Window<Decimal>,
    /// High `h`
    pub high: Window<Decimal>,
    /// Today's opening price `o`
    pub opening_price: Decimal,
}

impl TickerInfo {
    /// Get the mid price (average of bid and ask)
    pub fn mid_price(&self) -> Decimal {
        (self.ask.price + self.bid.price) / Decimal::TWO
    }

    /// Get spread in basis points, `None` without a market
    pub fn spread_bps(&self) -> Option<Decimal> {
        let mid = self.mid_price();
        if mid.is_zero() {
            return None;
        }
        Some((self.ask.price - self.bid.price) / mid * Decimal::from(10000))
    }

    fn decode(value: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let fields = Fields::new(value, "ticker", options)?;

        let ask = quote(&fields, "a")?;
        let bid = quote(&fields, "b")?;
        let last_trade = match fields.tuple("c", 2)? {
            Some(items) => LastTrade {
                price: decimal(&items[0], "c")?,
                lot_volume: decimal(&items[1], "c")?,
            },
            None => LastTrade::default(),
        };
        let trades = match fields.tuple("t", 2)? {
            Some(items) => Window {
                today: integer(&items[0], "t")?,
                last_24_hours: integer(&items[1], "t")?,
            },
            None => Window::default(),
        };

        Ok(Self {
            ask,
            bid,
            last_trade,
            volume: decimal_window(&fields, "v")?,
            vwap: decimal_window(&fields, "p")?,
            trades,
            low: decimal_window(&fields, "l")?,
            high: decimal_window(&fields, "h")?,
            opening_price: fields.decimal("o")?,
        })
    }
}

fn quote(fields: &Fields<'_>, key: &str) -> Result<Quote, DecodeError> {
    let Some(items) = fields.tuple(key, 3)? else {
        return Ok(Quote::default());
    };
    Ok(Quote {
        price: decimal(&items[0], key)?,
        whole_lot_volume: decimal(&items[1], key)?,
        lot_volume: decimal(&items[2], key)?,
    })
}

fn decimal_window(fields: &Fields<'_>, key: &str) -> Result<Window<Decimal>, DecodeError> {
    let Some(items) = fields.tuple(key, 2)? else {
        return Ok(Window::default());
    };
    Ok(Window {
        today: decimal(&items[0], key)?,
        last_24_hours: decimal(&items[1], key)?,
    })
}

/// Ticker results per pair; one malformed pair does not hide the others
pub type TickerResults = HashMap<String, Result<TickerInfo, DecodeError>>;

impl FromResult for TickerResults {
    fn from_result(result: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let pairs = object(result, "result")?;
        Ok(decode_keyed(pairs, |_, value| TickerInfo::decode(value, options)))
    }
}

// ============================================================================
// Asset pairs
// ============================================================================

/// One step of a volume-tiered fee schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fee {
    /// 30-day volume from which this tier applies
    pub volume: i64,
    /// Fee in percent
    pub percent: Decimal,
}

/// Tradable asset pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetPairInfo {
    pub altname: String,
    pub wsname: Option<String>,
    pub aclass_base: String,
    pub base: String,
    pub aclass_quote: String,
    pub quote: String,
    pub lot: String,
    pub cost_decimals: u32,
    pub pair_decimals: u32,
    pub lot_decimals: u32,
    pub lot_multiplier: u32,
    pub leverage_buy: Vec<u32>,
    pub leverage_sell: Vec<u32>,
    /// Taker fee schedule
    #[serde(deserialize_with = "fee_schedule")]
    pub fees: Vec<Fee>,
    /// Maker fee schedule
    #[serde(deserialize_with = "fee_schedule")]
    pub fees_maker: Vec<Fee>,
    pub fee_volume_currency: String,
    pub margin_call: u32,
    pub margin_stop: u32,
    pub ordermin: Option<Decimal>,
    pub costmin: Option<Decimal>,
    pub tick_size: Option<Decimal>,
    pub status: Option<String>,
}

fn fee_schedule<'de, D>(deserializer: D) -> Result<Vec<Fee>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(decode_fee_schedule(&entries))
}

/// `[[volume, percent], ...]`; entries that are not number pairs are skipped
pub(crate) fn decode_fee_schedule(entries: &[Value]) -> Vec<Fee> {
    decode_rows(entries, "fees", |entry| {
        let pair = tuple(entry, "fee", 2)?;
        if !pair.iter().all(Value::is_number) {
            return Err(DecodeError::UnexpectedType {
                field: "fee".to_string(),
                expected: "number",
            });
        }
        Ok(Fee {
            volume: integer(&pair[0], "fee volume")?,
            percent: decimal(&pair[1], "fee percent")?,
        })
    })
}

impl FromResult for HashMap<String, AssetPairInfo> {
    fn from_result(result: &Value, _options: &DecodeOptions) -> Result<Self, DecodeError> {
        let pairs = object(result, "result")?;
        Ok(collect_decoded(decode_keyed(pairs, |_, value| from_serde(value)), "asset pairs"))
    }
}

// ============================================================================
// Market data rows
// ============================================================================

/// OHLC candle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OhlcData {
    pub time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub vwap: Decimal,
    pub volume: Decimal,
    pub count: i64,
}

impl OhlcData {
    /// `[time, open, high, low, close, vwap, volume, count]`
    pub(crate) fn decode_row(row: &Value) -> Result<Self, DecodeError> {
        let items = tuple(row, "ohlc", 8)?;
        Ok(Self {
            time: unix_seconds(&items[0], "time")?,
            open: decimal(&items[1], "open")?,
            high: decimal(&items[2], "high")?,
            low: decimal(&items[3], "low")?,
            close: decimal(&items[4], "close")?,
            vwap: decimal(&items[5], "vwap")?,
            volume: decimal(&items[6], "volume")?,
            count: integer(&items[7], "count")?,
        })
    }
}

/// Public trade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeData {
    pub price: Decimal,
    pub volume: Decimal,
    pub time: DateTime<Utc>,
    pub side: Side,
    pub order_type: OrderType,
    pub misc: String,
    pub trade_id: i64,
}

impl TradeData {
    /// `[price, volume, time, side, order_type, misc, trade_id]`
    pub(crate) fn decode_row(row: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let items = tuple(row, "trade", 7)?;
        Ok(Self {
            price: decimal(&items[0], "price")?,
            volume: decimal(&items[1], "volume")?,
            time: fractional_timestamp(&items[2], "time", options.timestamp_scale)?,
            side: Side::from_code(string(&items[3], "side")?),
            order_type: OrderType::from_code(string(&items[4], "order_type")?),
            misc: string(&items[5], "misc")?.to_string(),
            trade_id: integer(&items[6], "trade_id")?,
        })
    }
}

/// Best bid and ask at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadData {
    pub time: DateTime<Utc>,
    pub bid: Decimal,
    pub ask: Decimal,
}

impl SpreadData {
    /// `[time, bid, ask]`
    pub(crate) fn decode_row(row: &Value) -> Result<Self, DecodeError> {
        let items = tuple(row, "spread", 3)?;
        Ok(Self {
            time: unix_seconds(&items[0], "time")?,
            bid: decimal(&items[1], "bid")?,
            ask: decimal(&items[2], "ask")?,
        })
    }
}

// ============================================================================
// Order book
// ============================================================================

/// Price level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBookEntry {
    pub price: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl OrderBookEntry {
    /// `[price, volume, timestamp]`
    fn decode_row(row: &Value) -> Result<Self, DecodeError> {
        let items = tuple(row, "level", 3)?;
        Ok(Self {
            price: decimal(&items[0], "price")?,
            volume: decimal(&items[1], "volume")?,
            timestamp: unix_seconds(&items[2], "timestamp")?,
        })
    }
}

/// Order book snapshot for one pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBook {
    pub asks: Vec<OrderBookEntry>,
    pub bids: Vec<OrderBookEntry>,
}

impl OrderBook {
    /// Get best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|level| level.price)
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|level| level.price)
    }

    /// Get spread
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    fn decode(value: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let fields = Fields::new(value, "book", options)?;
        let side = |key: &str| -> Result<Vec<OrderBookEntry>, DecodeError> {
            match fields.get(key) {
                Some(rows) => Ok(decode_rows(
                    array(rows, key)?,
                    key,
                    OrderBookEntry::decode_row,
                )),
                None => Ok(Vec::new()),
            }
        };

        Ok(Self {
            asks: side("asks")?,
            bids: side("bids")?,
        })
    }
}

impl FromResult for HashMap<String, OrderBook> {
    fn from_result(result: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let books = object(result, "result")?;
        Ok(collect_decoded(
            decode_keyed(books, |_, value| OrderBook::decode(value, options)),
            "order book",
        ))
    }
}

// ============================================================================
// Balances
// ============================================================================

/// Cash balances per asset, net of pending withdrawals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBalance(pub HashMap<String, Decimal>);

impl AccountBalance {
    /// Get balance for a specific asset
    pub fn get(&self, asset: &str) -> Option<Decimal> {
        self.0.get(asset).copied()
    }

    /// Get all non-zero balances
    pub fn non_zero(&self) -> HashMap<String, Decimal> {
        self.0
            .iter()
            .filter(|(_, balance)| !balance.is_zero())
            .map(|(asset, balance)| (asset.clone(), *balance))
            .collect()
    }

    /// Iterate over all balances
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter()
    }
}

impl FromResult for AccountBalance {
    fn from_result(result: &Value, _options: &DecodeOptions) -> Result<Self, DecodeError> {
        let balances = object(result, "result")?;
        Ok(Self(collect_decoded(
            decode_keyed(balances, |asset, value| decimal(value, asset)),
            "balance",
        )))
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Order description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDescription {
    pub pair: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Primary price
    pub price: Decimal,
    /// Secondary price
    pub price2: Decimal,
    pub leverage: String,
    /// Human readable summary
    pub order: String,
    /// Conditional close order summary
    pub close: String,
}

impl OrderDescription {
    fn decode(fields: &Fields<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            pair: fields.string("pair"),
            side: fields.string("type").parse().unwrap_or_default(),
            order_type: fields.string("ordertype").parse().unwrap_or_default(),
            price: fields.decimal("price")?,
            price2: fields.decimal("price2")?,
            leverage: fields.string("leverage"),
            order: fields.string("order"),
            close: fields.string("close"),
        })
    }
}

/// Open or closed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    pub refid: Option<String>,
    pub userref: Option<i64>,
    pub status: OrderStatus,
    pub opened_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub description: OrderDescription,
    pub volume: Decimal,
    pub volume_executed: Decimal,
    pub cost: Decimal,
    pub fee: Decimal,
    /// Average price
    pub price: Decimal,
    pub stop_price: Decimal,
    pub limit_price: Decimal,
    pub misc: Vec<OrderMisc>,
    pub flags: Vec<OrderFlag>,
    /// Related trade ids, when requested
    pub trades: Vec<String>,
    /// Reason for closing or cancelling
    pub reason: Option<String>,
}

impl Order {
    /// Volume still to be filled
    pub fn remaining_volume(&self) -> Decimal {
        self.volume - self.volume_executed
    }

    pub(crate) fn decode(value: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let fields = Fields::new(value, "order", options)?;

        let description = match fields.object("descr")? {
            Some(descr) => OrderDescription::decode(&descr)?,
            None => OrderDescription::default(),
        };
        let trades: Vec<String> = match fields.get("trades") {
            Some(ids) => array(ids, "trades")?
                .iter()
                .map(|id| string(id, "trades").map(str::to_string))
                .collect::<Result<_, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            refid: fields.opt_string("refid"),
            userref: fields.opt_integer("userref")?,
            status: fields.string("status").parse().unwrap_or_default(),
            opened_at: fields.timestamp("opentm")?,
            started_at: fields.opt_unix_seconds("starttm")?,
            expires_at: fields.opt_unix_seconds("expiretm")?,
            closed_at: fields.opt_timestamp("closetm")?,
            description,
            volume: fields.decimal("vol")?,
            volume_executed: fields.decimal("vol_exec")?,
            cost: fields.decimal("cost")?,
            fee: fields.decimal("fee")?,
            price: fields.decimal("price")?,
            stop_price: fields.decimal("stopprice")?,
            limit_price: fields.decimal("limitprice")?,
            misc: parse_flag_list(&fields.string("misc")),
            flags: parse_flag_list(&fields.string("oflags")),
            trades,
            reason: fields.opt_string("reason"),
        })
    }

    /// Decode an object keyed by transaction id, dropping orders that fail
    pub(crate) fn decode_map(value: &Value, field: &str, options: &DecodeOptions) -> Result<HashMap<String, Self>, DecodeError> {
        let orders = object(value, field)?;
        Ok(collect_decoded(
            decode_keyed(orders, |_, order| Self::decode(order, options)),
            field,
        ))
    }
}

impl FromResult for HashMap<String, Order> {
    fn from_result(result: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        Order::decode_map(result, "result", options)
    }
}
