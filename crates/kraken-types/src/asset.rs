//! Asset and asset pair identifiers (XBT, XBTUSD, XXBTZUSD, ...)

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A currency code as Kraken names it on the REST API (e.g. "XBT", "ZUSD")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asset(Cow<'static, str>);

impl Asset {
    /// Bitcoin
    pub const XBT: Asset = Asset(Cow::Borrowed("XBT"));
    /// Ether
    pub const ETH: Asset = Asset(Cow::Borrowed("ETH"));
    /// US dollar (Kraken's legacy "Z" prefix)
    pub const ZUSD: Asset = Asset(Cow::Borrowed("ZUSD"));
    /// Euro (Kraken's legacy "Z" prefix)
    pub const ZEUR: Asset = Asset(Cow::Borrowed("ZEUR"));

    /// Create an asset without validation
    pub fn new(s: impl Into<String>) -> Self {
        Self(Cow::Owned(s.into()))
    }

    /// Get the asset code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A tradable pair as Kraken names it on the REST API (e.g. "XBTUSD")
///
/// The REST API accepts altnames ("XBTUSD") and answers with canonical
/// names ("XXBTZUSD"), so no particular format is enforced beyond what
/// survives the comma-separated `pair` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetPair(Cow<'static, str>);

impl AssetPair {
    /// BTC/USD
    pub const XBTUSD: AssetPair = AssetPair(Cow::Borrowed("XBTUSD"));
    /// ETH/USD
    pub const ETHUSD: AssetPair = AssetPair(Cow::Borrowed("ETHUSD"));
    /// BTC/EUR
    pub const XBTEUR: AssetPair = AssetPair(Cow::Borrowed("XBTEUR"));

    /// Create a pair without validation
    pub fn new(s: impl Into<String>) -> Self {
        Self(Cow::Owned(s.into()))
    }

    /// Get the pair name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the pair name is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Join identifiers into the comma-separated list the REST API expects
pub fn join_list<T: AsRef<str>>(items: &[T]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

fn validate(s: &str) -> Result<(), AssetParseError> {
    if s.is_empty() {
        return Err(AssetParseError::Empty);
    }
    if s.contains(',') {
        return Err(AssetParseError::ContainsComma(s.to_string()));
    }
    if s.chars().any(char::is_whitespace) {
        return Err(AssetParseError::ContainsWhitespace(s.to_string()));
    }
    Ok(())
}

impl FromStr for Asset {
    type Err = AssetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)?;
        Ok(Self::new(s))
    }
}

impl FromStr for AssetPair {
    type Err = AssetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)?;
        Ok(Self::new(s))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Asset {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AssetPair {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Asset {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Asset {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AssetPair {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetPair {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Error parsing an asset or pair name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetParseError {
    #[error("Identifier is empty")]
    Empty,

    #[error("Identifier must not contain ',': {0}")]
    ContainsComma(String),

    #[error("Identifier must not contain whitespace: {0}")]
    ContainsWhitespace(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_parse() {
        let pair: AssetPair = "XBTUSD".parse().unwrap();
        assert_eq!(pair.as_str(), "XBTUSD");
        assert_eq!(pair.to_string(), "XBTUSD");
    }

    #[test]
    fn test_pair_parse_error() {
        assert_eq!("".parse::<AssetPair>(), Err(AssetParseError::Empty));
        assert!("XBTUSD,ETHUSD".parse::<AssetPair>().is_err());
        assert!("XBT USD".parse::<AssetPair>().is_err());
        assert!("XBT,".parse::<Asset>().is_err());
    }

    #[test]
    fn test_join_list() {
        let pairs = [AssetPair::XBTUSD, AssetPair::from("ETHUSD")];
        assert_eq!(join_list(&pairs), "XBTUSD,ETHUSD");

        let empty: [Asset; 0] = [];
        assert_eq!(join_list(&empty), "");
    }

    #[test]
    fn test_asset_serde_transparent() {
        let asset: Asset = serde_json::from_str("\"ZUSD\"").unwrap();
        assert_eq!(asset, Asset::ZUSD);
    }
}
