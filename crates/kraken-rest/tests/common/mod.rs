//! Common test utilities and fixtures for integration tests
//!
//! Contains sample JSON responses shaped like live Kraken REST replies

#![allow(dead_code)]

use kraken_rest::{
    ClientConfig, Credentials, HttpRequest, HttpResponse, KrakenRestClient, Transport,
    TransportError,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Secret from Kraken's signing documentation
pub const DOC_SECRET: &str =
    "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";

pub const SERVER_TIME: &str = r#"{
    "error": [],
    "result": {
        "unixtime": 1688669448,
        "rfc1123": "Thu, 06 Jul 23 18:50:48 +0000"
    }
}"#;

pub const SYSTEM_STATUS: &str = r#"{
    "error": [],
    "result": {
        "status": "online",
        "timestamp": "2023-07-06T18:52:00Z"
    }
}"#;

pub const INVALID_ARGUMENTS: &str = r#"{"error":["EGeneral:Invalid arguments"]}"#;

pub const RATE_LIMITED: &str = r#"{"error":["EAPI:Rate limit exceeded"]}"#;

/// Two pairs, the second with a truncated ask array
pub const TICKER_PARTIAL: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": {
            "a": ["30300.10000", "1", "1.000"],
            "b": ["30300.00000", "1", "1.000"],
            "c": ["30303.20000", "0.00067643"],
            "v": ["4083.67001100", "4412.73601799"],
            "p": ["30706.77771", "30689.13205"],
            "t": [34619, 38907],
            "l": ["29868.30000", "29868.30000"],
            "h": ["31631.00000", "31631.00000"],
            "o": "30502.80000"
        },
        "XETHZUSD": {
            "a": ["1864.95000"],
            "b": ["1864.94000", "10", "10.000"],
            "c": ["1864.95000", "0.05000000"],
            "v": ["21364.50613924", "23134.11183232"],
            "p": ["1881.41573", "1880.43779"],
            "t": [21547, 24237],
            "l": ["1839.58000", "1839.58000"],
            "h": ["1912.95000", "1912.95000"],
            "o": "1897.45000"
        }
    }
}"#;

pub const ASSET_PAIRS: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": {
            "altname": "XBTUSD",
            "wsname": "XBT/USD",
            "aclass_base": "currency",
            "base": "XXBT",
            "aclass_quote": "currency",
            "quote": "ZUSD",
            "lot": "unit",
            "cost_decimals": 5,
            "pair_decimals": 1,
            "lot_decimals": 8,
            "lot_multiplier": 1,
            "leverage_buy": [2, 3, 4, 5],
            "leverage_sell": [2, 3, 4, 5],
            "fees": [[0, 0.26], [50000, 0.24], [100000, 0.22], [250000]],
            "fees_maker": [[0, 0.16], [50000, 0.14]],
            "fee_volume_currency": "ZUSD",
            "margin_call": 80,
            "margin_stop": 40,
            "ordermin": "0.0001",
            "costmin": "0.5",
            "tick_size": "0.1",
            "status": "online"
        }
    }
}"#;

pub const OHLC: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": [
            [1688671200, "30306.1", "30306.2", "30305.7", "30305.7", "30306.1", "3.39243896", 23],
            [1688671260, "30305.7", "30305.7", "bad", "30300.3", "30304.9", "0.53498914", 8],
            [1688671320, "30300.3", "30300.4", "30291.4", "30291.4", "30294.7", "2.13410078", 25]
        ],
        "last": 1688672160
    }
}"#;

pub const DEPTH: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": {
            "asks": [
                ["30384.10000", "2.059", 1688671659],
                ["30387.90000", "1.500", 1688671380]
            ],
            "bids": [
                ["30297.00000", "1.115", 1688671636],
                ["30296.70000", "0.002"]
            ]
        }
    }
}"#;

pub const TRADES: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": [
            ["30243.40000", "0.34507674", 1688669597.8277, "b", "m", "", 61044952],
            ["30243.30000", "0.00376960", 1688669598.2804, "s", "l", "", 61044953]
        ],
        "last": "1688671969993150842"
    }
}"#;

pub const SPREAD: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": [
            [1688671834, "30292.10000", "30297.50000"],
            [1688671836, "30292.10000", "30296.70000"]
        ],
        "last": 1688672106
    }
}"#;

pub const BALANCE: &str = r#"{
    "error": [],
    "result": {
        "ZUSD": "171288.6158",
        "ZEUR": "504861.8946",
        "XXBT": "1011.1908877900",
        "XETH": "0.0000000000"
    }
}"#;

pub const OPEN_ORDERS: &str = r#"{
    "error": [],
    "result": {
        "open": {
            "OQCLML-BW3P3-BUCMWZ": {
                "refid": null,
                "userref": 0,
                "status": "open",
                "opentm": 1688666559.8974,
                "starttm": 0,
                "expiretm": 0,
                "descr": {
                    "pair": "XBTUSD",
                    "type": "buy",
                    "ordertype": "limit",
                    "price": "30010.0",
                    "price2": "0",
                    "leverage": "none",
                    "order": "buy 1.25000000 XBTUSD @ limit 30010.0",
                    "close": ""
                },
                "vol": "1.25000000",
                "vol_exec": "0.37500000",
                "cost": "11253.7",
                "fee": "0.00000",
                "price": "30010.0",
                "stopprice": "0.00000",
                "limitprice": "0.00000",
                "misc": "",
                "oflags": "fciq,unknownflag",
                "trades": ["TCCCTY-WE2O6-P3NB37"]
            }
        }
    }
}"#;

/// Canned responses in order; records every request it sees
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        let response = HttpResponse {
            status,
            headers: Vec::new(),
            body: (!body.is_empty()).then(|| body.as_bytes().to_vec()),
        };
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(&self, error: TransportError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request sent")
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no canned response".to_string())))
    }
}

/// Public client over a mock transport
pub fn public_client(transport: &MockTransport) -> KrakenRestClient {
    KrakenRestClient::with_transport(ClientConfig::default(), transport.clone())
}

/// Authenticated client over a mock transport
pub fn private_client(transport: &MockTransport) -> KrakenRestClient {
    let config = ClientConfig::default().with_credentials(Credentials::new("API_KEY", DOC_SECRET));
    KrakenRestClient::with_transport(config, transport.clone())
}
