//! Request parameters as a form-url-encoded body

use chrono::{DateTime, Utc};
use kraken_types::{join_list, Asset, AssetClass, AssetPair, CloseTime, OhlcInterval, PairInformation};
use std::collections::BTreeMap;

use crate::error::{RestError, RestResult};

/// Parameter name to list of values
///
/// Keys are kept sorted, so the encoded body is stable for a given set of
/// parameters. A payload is built fresh for every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    params: BTreeMap<String, Vec<String>>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all values for `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.insert(key.into(), vec![value.into()]);
        self
    }

    /// Add a value for `key`, keeping existing ones
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.entry(key.into()).or_default().push(value.into());
        self
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`
    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Encode as `application/x-www-form-urlencoded`, keys in sorted order
    pub fn encode(&self) -> RestResult<String> {
        let pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
            .collect();

        serde_urlencoded::to_string(pairs).map_err(|e| RestError::InvalidParameter(e.to_string()))
    }

    /// Parse a form-url-encoded body
    pub fn parse(encoded: &str) -> RestResult<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(encoded)
            .map_err(|e| RestError::InvalidParameter(e.to_string()))?;

        let mut payload = Self::new();
        for (key, value) in pairs {
            payload.append(key, value);
        }
        Ok(payload)
    }

    // ========================================================================
    // Endpoint options
    // ========================================================================

    /// `asset`: comma-joined list, omitted when empty
    pub fn set_assets(&mut self, assets: &[Asset]) -> &mut Self {
        if !assets.is_empty() {
            self.set("asset", join_list(assets));
        }
        self
    }

    /// `asset`: single base asset (trade balance)
    pub fn set_asset(&mut self, asset: &Asset) -> &mut Self {
        self.set("asset", asset.as_str())
    }

    pub fn set_asset_class(&mut self, asset_class: AssetClass) -> &mut Self {
        self.set("aclass", asset_class.as_str())
    }

    /// `pair`: comma-joined list, omitted when empty
    pub fn set_pairs(&mut self, pairs: &[AssetPair]) -> &mut Self {
        if !pairs.is_empty() {
            self.set("pair", join_list(pairs));
        }
        self
    }

    pub fn set_count(&mut self, count: u32) -> &mut Self {
        self.set("count", count.to_string())
    }

    pub fn set_information(&mut self, info: PairInformation) -> &mut Self {
        self.set("info", info.as_str())
    }

    pub fn set_interval(&mut self, interval: OhlcInterval) -> &mut Self {
        self.set("interval", interval.minutes().to_string())
    }

    /// `since`: Unix seconds
    pub fn set_since(&mut self, since: DateTime<Utc>) -> &mut Self {
        self.set("since", since.timestamp().to_string())
    }

    /// `userref`: omitted when zero
    pub fn set_user_reference_id(&mut self, userref: i32) -> &mut Self {
        if userref != 0 {
            self.set("userref", userref.to_string());
        }
        self
    }

    pub fn set_with_related_trades(&mut self, trades: bool) -> &mut Self {
        self.set("trades", trades.to_string())
    }

    /// `txid`: comma-joined list
    pub fn set_transaction_ids(&mut self, txids: &[String]) -> &mut Self {
        if !txids.is_empty() {
            self.set("txid", join_list(txids));
        }
        self
    }

    /// `start`: Unix seconds
    pub fn set_start(&mut self, start: DateTime<Utc>) -> &mut Self {
        self.set("start", start.timestamp().to_string())
    }

    /// `end`: Unix seconds
    pub fn set_end(&mut self, end: DateTime<Utc>) -> &mut Self {
        self.set("end", end.timestamp().to_string())
    }

    pub fn set_offset(&mut self, offset: u32) -> &mut Self {
        self.set("ofs", offset.to_string())
    }

    pub fn set_close_time(&mut self, close_time: CloseTime) -> &mut Self {
        self.set("closetime", close_time.as_str())
    }
}
