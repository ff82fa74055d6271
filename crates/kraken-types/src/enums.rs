//! Side, OrderType, OrderStatus, OhlcInterval and request parameter enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade or order side
///
/// `Unknown` is kept distinct from a missing value so that a side code
/// Kraken has not documented yet does not fail the surrounding decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy
    Buy,
    /// Sell
    Sell,
    /// Unrecognised side code
    #[default]
    #[serde(other)]
    Unknown,
}

impl Side {
    /// Parse the single-character code used in trade rows ("b" / "s")
    pub fn from_code(code: &str) -> Self {
        match code {
            "b" => Self::Buy,
            "s" => Self::Sell,
            _ => Self::Unknown,
        }
    }

    /// Returns the name as used in API messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for Side {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "buy" => Self::Buy,
            "sell" => Self::Sell,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    /// Market order
    Market,
    /// Limit order
    Limit,
    /// Stop loss
    StopLoss,
    /// Take profit
    TakeProfit,
    /// Stop loss limit
    StopLossLimit,
    /// Take profit limit
    TakeProfitLimit,
    /// Trailing stop
    TrailingStop,
    /// Trailing stop limit
    TrailingStopLimit,
    /// Settle position
    SettlePosition,
    /// Unrecognised order type
    #[default]
    #[serde(other)]
    Unknown,
}

impl OrderType {
    /// Parse the single-character code used in trade rows ("m" / "l")
    pub fn from_code(code: &str) -> Self {
        match code {
            "m" => Self::Market,
            "l" => Self::Limit,
            _ => Self::Unknown,
        }
    }

    /// Returns the name as used in API messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::StopLoss => "stop-loss",
            Self::TakeProfit => "take-profit",
            Self::StopLossLimit => "stop-loss-limit",
            Self::TakeProfitLimit => "take-profit-limit",
            Self::TrailingStop => "trailing-stop",
            Self::TrailingStopLimit => "trailing-stop-limit",
            Self::SettlePosition => "settle-position",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for OrderType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "market" => Self::Market,
            "limit" => Self::Limit,
            "stop-loss" => Self::StopLoss,
            "take-profit" => Self::TakeProfit,
            "stop-loss-limit" => Self::StopLossLimit,
            "take-profit-limit" => Self::TakeProfitLimit,
            "trailing-stop" => Self::TrailingStop,
            "trailing-stop-limit" => Self::TrailingStopLimit,
            "settle-position" => Self::SettlePosition,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order pending book entry
    Pending,
    /// Open order
    Open,
    /// Closed order
    Closed,
    /// Order canceled
    Canceled,
    /// Order expired
    Expired,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => Self::Pending,
            "open" => Self::Open,
            "closed" => Self::Closed,
            "canceled" => Self::Canceled,
            "expired" => Self::Expired,
            _ => Self::Unknown,
        })
    }
}

/// OHLC interval in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OhlcInterval {
    /// 1 minute
    #[default]
    M1 = 1,
    /// 5 minutes
    M5 = 5,
    /// 15 minutes
    M15 = 15,
    /// 30 minutes
    M30 = 30,
    /// 1 hour (60 minutes)
    H1 = 60,
    /// 4 hours (240 minutes)
    H4 = 240,
    /// 1 day (1440 minutes)
    D1 = 1440,
    /// 1 week (10080 minutes)
    W1 = 10080,
    /// 15 days (21600 minutes)
    D15 = 21600,
}

impl OhlcInterval {
    /// Returns the interval length in minutes
    pub fn minutes(&self) -> u32 {
        *self as u32
    }
}

/// Asset class filter for the `Assets` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    #[default]
    Currency,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Currency => "currency",
        }
    }
}

/// Which slice of pair information the `AssetPairs` endpoint returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PairInformation {
    /// All info
    #[default]
    Info,
    /// Leverage info
    Leverage,
    /// Fees schedule
    Fees,
    /// Margin info
    Margin,
}

impl PairInformation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Leverage => "leverage",
            Self::Fees => "fees",
            Self::Margin => "margin",
        }
    }
}

/// Which timestamp a closed-order range filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloseTime {
    Open,
    Close,
    #[default]
    Both,
}

impl CloseTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Both => "both",
        }
    }
}

/// Trading mode reported by the `SystemStatus` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SystemState {
    /// Normal operation
    Online,
    /// Maintenance mode
    Maintenance,
    /// Cancel-only mode
    CancelOnly,
    /// Post-only mode
    PostOnly,
    /// Limit-only mode
    LimitOnly,
    /// Reduce-only mode
    ReduceOnly,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Maintenance => write!(f, "maintenance"),
            Self::CancelOnly => write!(f, "cancel_only"),
            Self::PostOnly => write!(f, "post_only"),
            Self::LimitOnly => write!(f, "limit_only"),
            Self::ReduceOnly => write!(f, "reduce_only"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
