//! Private account endpoints
//!
//! These endpoints require authentication.

use chrono::{DateTime, Utc};
use kraken_types::{Asset, CloseTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::client::KrakenRestClient;
use crate::decode::{DecodeOptions, Fields, FromResult};
use crate::error::{DecodeError, RestError, RestResult};
use crate::payload::Payload;
use crate::request::Visibility;
use crate::types::{AccountBalance, Order};

/// Most transaction ids a single `QueryOrders` call accepts
pub const MAX_QUERY_TXIDS: usize = 50;

/// Trade balance (margin info)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeBalance {
    /// Equivalent balance (combined balance of all currencies) `eb`
    pub equivalent_balance: Decimal,
    /// Trade balance (combined balance of all equity currencies) `tb`
    pub trade_balance: Decimal,
    /// Margin amount of open positions `m`
    pub margin: Decimal,
    /// Unrealized net profit/loss of open positions `n`
    pub unrealized_pnl: Decimal,
    /// Cost basis of open positions `c`
    pub cost_basis: Decimal,
    /// Current floating valuation of open positions `v`
    pub floating_valuation: Decimal,
    /// Equity: trade balance + unrealized net profit/loss `e`
    pub equity: Decimal,
    /// Free margin: equity - initial margin `mf`
    pub free_margin: Decimal,
    /// Margin level: (equity / initial margin) * 100 `ml`
    pub margin_level: Decimal,
    /// Value of unfilled and partially filled orders `uv`
    pub unexecuted_value: Decimal,
}

impl FromResult for TradeBalance {
    fn from_result(result: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let fields = Fields::new(result, "result", options)?;
        Ok(Self {
            equivalent_balance: fields.decimal("eb")?,
            trade_balance: fields.decimal("tb")?,
            margin: fields.decimal("m")?,
            unrealized_pnl: fields.decimal("n")?,
            cost_basis: fields.decimal("c")?,
            floating_valuation: fields.decimal("v")?,
            equity: fields.decimal("e")?,
            free_margin: fields.decimal("mf")?,
            margin_level: fields.decimal("ml")?,
            unexecuted_value: fields.decimal("uv")?,
        })
    }
}

/// Open orders result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOrders {
    pub open: HashMap<String, Order>,
}

impl FromResult for OpenOrders {
    fn from_result(result: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let fields = Fields::new(result, "result", options)?;
        let open = match fields.get("open") {
            Some(orders) => Order::decode_map(orders, "open", options)?,
            None => HashMap::new(),
        };
        Ok(Self { open })
    }
}

/// Closed orders result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosedOrders {
    pub closed: HashMap<String, Order>,
    /// Total number of matching orders, for paging with `ofs`
    pub count: i64,
}

impl FromResult for ClosedOrders {
    fn from_result(result: &Value, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let fields = Fields::new(result, "result", options)?;
        let closed = match fields.get("closed") {
            Some(orders) => Order::decode_map(orders, "closed", options)?,
            None => HashMap::new(),
        };
        Ok(Self {
            closed,
            count: fields.integer("count")?,
        })
    }
}

/// Filters for `ClosedOrders`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosedOrdersRequest {
    pub trades: Option<bool>,
    pub userref: Option<i32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub offset: Option<u32>,
    pub close_time: Option<CloseTime>,
}

impl ClosedOrdersRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include related trade ids
    pub fn with_trades(mut self, trades: bool) -> Self {
        self.trades = Some(trades);
        self
    }

    pub fn with_userref(mut self, userref: i32) -> Self {
        self.userref = Some(userref);
        self
    }

    /// Only orders after this time
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Only orders before this time
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Skip this many results
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_close_time(mut self, close_time: CloseTime) -> Self {
        self.close_time = Some(close_time);
        self
    }

    fn payload(&self) -> Payload {
        let mut payload = Payload::new();
        if let Some(trades) = self.trades {
            payload.set_with_related_trades(trades);
        }
        if let Some(userref) = self.userref {
            payload.set_user_reference_id(userref);
        }
        if let Some(start) = self.start {
            payload.set_start(start);
        }
        if let Some(end) = self.end {
            payload.set_end(end);
        }
        if let Some(offset) = self.offset {
            payload.set_offset(offset);
        }
        if let Some(close_time) = self.close_time {
            payload.set_close_time(close_time);
        }
        payload
    }
}

fn order_filters(trades: Option<bool>, userref: Option<i32>) -> Payload {
    let mut payload = Payload::new();
    if let Some(trades) = trades {
        payload.set_with_related_trades(trades);
    }
    if let Some(userref) = userref {
        payload.set_user_reference_id(userref);
    }
    payload
}

/// Private account endpoints
pub struct AccountEndpoints<'a> {
    client: &'a KrakenRestClient,
}

impl<'a> AccountEndpoints<'a> {
    pub fn new(client: &'a KrakenRestClient) -> Self {
        Self { client }
    }

    fn call<T: FromResult>(&self, endpoint: &str, payload: Payload) -> RestResult<T> {
        self.client.call(endpoint, Visibility::Private, payload)
    }

    /// Get account balance
    #[instrument(skip(self))]
    pub fn get_balance(&self) -> RestResult<AccountBalance> {
        debug!("Fetching account balance");
        self.call("Balance", Payload::new())
    }

    /// Get trade balance (margin info)
    ///
    /// # Arguments
    /// * `asset` - Base asset for calculations (server default: "ZUSD")
    #[instrument(skip(self))]
    pub fn get_trade_balance(&self, asset: Option<&Asset>) -> RestResult<TradeBalance> {
        let mut payload = Payload::new();
        if let Some(asset) = asset {
            payload.set_asset(asset);
        }

        debug!("Fetching trade balance");
        self.call("TradeBalance", payload)
    }

    /// Get open orders
    ///
    /// # Arguments
    /// * `trades` - Include trades in output
    /// * `userref` - Restrict to a user reference id
    #[instrument(skip(self))]
    pub fn get_open_orders(
        &self,
        trades: Option<bool>,
        userref: Option<i32>,
    ) -> RestResult<OpenOrders> {
        debug!("Fetching open orders");
        self.call("OpenOrders", order_filters(trades, userref))
    }

    /// Get closed orders
    #[instrument(skip(self))]
    pub fn get_closed_orders(&self, request: &ClosedOrdersRequest) -> RestResult<ClosedOrders> {
        debug!("Fetching closed orders");
        self.call("ClosedOrders", request.payload())
    }

    /// Query orders by transaction id
    ///
    /// # Arguments
    /// * `txids` - Between 1 and 50 transaction ids
    #[instrument(skip(self))]
    pub fn query_orders(
        &self,
        txids: &[String],
        trades: Option<bool>,
        userref: Option<i32>,
    ) -> RestResult<HashMap<String, Order>> {
        if txids.is_empty() || txids.iter().any(String::is_empty) {
            return Err(RestError::InvalidParameter("txid is required".to_string()));
        }
        if txids.len() > MAX_QUERY_TXIDS {
            return Err(RestError::InvalidParameter(format!(
                "at most {} txids per query, got {}",
                MAX_QUERY_TXIDS,
                txids.len()
            )));
        }

        let mut payload = order_filters(trades, userref);
        payload.set_transaction_ids(txids);

        debug!("Querying {} orders", txids.len());
        self.call("QueryOrders", payload)
    }
}
