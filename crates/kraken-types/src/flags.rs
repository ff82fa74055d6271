//! Comma-delimited flag lists (`oflags`, `misc`)
//!
//! Unknown tokens are dropped so a flag Kraken adds later never breaks
//! decoding of an otherwise valid order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderFlag {
    /// Post-only order (maker only)
    Post,
    /// Fee in base currency
    FeeInBaseCurrency,
    /// Fee in quote currency
    FeeInQuoteCurrency,
    /// Disable market price protection
    NoMarketPriceProtection,
    /// Order volume in quote currency
    VolumeInQuoteCurrency,
}

impl OrderFlag {
    /// Get the API string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::FeeInBaseCurrency => "fcib",
            Self::FeeInQuoteCurrency => "fciq",
            Self::NoMarketPriceProtection => "nompp",
            Self::VolumeInQuoteCurrency => "viqc",
        }
    }
}

impl FromStr for OrderFlag {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "fcib" => Ok(Self::FeeInBaseCurrency),
            "fciq" => Ok(Self::FeeInQuoteCurrency),
            "nompp" => Ok(Self::NoMarketPriceProtection),
            "viqc" => Ok(Self::VolumeInQuoteCurrency),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

impl fmt::Display for OrderFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Miscellaneous order info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderMisc {
    /// Triggered by stop price
    Stopped,
    /// Triggered by touch price
    Touched,
    /// Liquidation
    Liquidated,
    /// Partial fill
    Partial,
}

impl OrderMisc {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Touched => "touched",
            Self::Liquidated => "liquidated",
            Self::Partial => "partial",
        }
    }
}

impl FromStr for OrderMisc {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stopped" => Ok(Self::Stopped),
            "touched" => Ok(Self::Touched),
            "liquidated" => Ok(Self::Liquidated),
            "partial" => Ok(Self::Partial),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

/// A flag token that is not part of the known vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown flag token: {0}")]
pub struct UnknownToken(pub String);

/// Split a comma-delimited flag string, keeping only recognised tokens
///
/// An empty string yields an empty list. Surrounding whitespace on each
/// token is ignored.
pub fn parse_flag_list<T: FromStr>(raw: &str) -> Vec<T> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flags() {
        let flags: Vec<OrderFlag> = parse_flag_list("");
        assert!(flags.is_empty());
    }

    #[test]
    fn test_known_flags() {
        let flags: Vec<OrderFlag> = parse_flag_list("post,fcib");
        assert_eq!(flags, vec![OrderFlag::Post, OrderFlag::FeeInBaseCurrency]);
    }

    #[test]
    fn test_unknown_flag_dropped() {
        let flags: Vec<OrderFlag> = parse_flag_list("post,unknownflag");
        assert_eq!(flags, vec![OrderFlag::Post]);
    }

    #[test]
    fn test_all_flags() {
        let flags: Vec<OrderFlag> = parse_flag_list("fciq,nompp,viqc");
        assert_eq!(
            flags,
            vec![
                OrderFlag::FeeInQuoteCurrency,
                OrderFlag::NoMarketPriceProtection,
                OrderFlag::VolumeInQuoteCurrency,
            ]
        );
    }

    #[test]
    fn test_misc_list() {
        let misc: Vec<OrderMisc> = parse_flag_list("partial,stopped,");
        assert_eq!(misc, vec![OrderMisc::Partial, OrderMisc::Stopped]);
    }

    #[test]
    fn test_flag_round_trip_names() {
        for flag in [
            OrderFlag::Post,
            OrderFlag::FeeInBaseCurrency,
            OrderFlag::FeeInQuoteCurrency,
            OrderFlag::NoMarketPriceProtection,
            OrderFlag::VolumeInQuoteCurrency,
        ] {
            assert_eq!(flag.as_str().parse::<OrderFlag>(), Ok(flag));
        }
    }
}
