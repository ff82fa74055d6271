//! Response decoding
//!
//! Every Kraken response is a JSON envelope `{"error": [...], "result": ...}`.
//! [`decode`] validates the envelope and hands the result to a
//! [`FromResult`] implementation. Results use positional arrays, decimals
//! encoded as strings and fractional Unix timestamps; the helpers here turn
//! those into typed values, one field at a time.
//!
//! Decoding is permissive: absent fields take zero values, a malformed row is
//! skipped and a malformed entry in a keyed object is dropped or reported
//! for that key alone.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use crate::error::{DecodeError, RestError, RestResult};

/// How the fractional part of a Unix timestamp is interpreted
///
/// Kraken sends order and trade times as `seconds.fraction`. Historical
/// clients of this API multiply the fraction by 10,000 and take the result as
/// nanoseconds, which loses most of the sub-second precision. Reading the
/// fraction as microseconds is closer to what the exchange documents. Both
/// are available until the exchange format is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimestampScale {
    /// Fraction × 10,000, as nanoseconds
    #[default]
    TenThousand,
    /// Fraction × 1,000,000, as microseconds
    Microseconds,
}

/// Options applied while mapping a result payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub timestamp_scale: TimestampScale,
}

impl DecodeOptions {
    pub fn with_timestamp_scale(mut self, scale: TimestampScale) -> Self {
        self.timestamp_scale = scale;
        self
    }
}

/// API response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub error: Vec<String>,
    #[serde(default)]
    pub result: Value,
}

impl ApiResponse {
    /// Convert to a result, returning the error list if not empty
    pub fn into_result(self) -> Result<Value, Vec<String>> {
        if self.error.is_empty() {
            Ok(self.result)
        } else {
            Err(self.error)
        }
    }
}

/// A type that can be built from the `result` member of an envelope
pub trait FromResult: Sized {
    fn from_result(result: &Value, options: &DecodeOptions) -> Result<Self, DecodeError>;
}

impl FromResult for Value {
    fn from_result(result: &Value, _options: &DecodeOptions) -> Result<Self, DecodeError> {
        Ok(result.clone())
    }
}

/// Validate the envelope and map its result into `T`
///
/// Checks run in order: HTTP status, body presence, envelope shape, server
/// errors, then the result mapping.
pub fn decode<T: FromResult>(
    status: u16,
    body: Option<&[u8]>,
    options: &DecodeOptions,
) -> RestResult<T> {
    if status != 200 {
        return Err(RestError::Http { status });
    }

    let body = match body {
        Some(body) if !body.is_empty() => body,
        _ => return Err(RestError::EmptyBody),
    };

    let envelope: ApiResponse =
        serde_json::from_slice(body).map_err(|e| RestError::MalformedEnvelope(e.to_string()))?;

    let result = envelope.into_result().map_err(RestError::from_api_errors)?;

    Ok(T::from_result(&result, options)?)
}

/// Decode through serde, for shapes that need no positional handling
pub(crate) fn from_serde<T: DeserializeOwned>(value: &Value) -> Result<T, DecodeError> {
    Ok(T::deserialize(value)?)
}

// ============================================================================
// Combinators
// ============================================================================

/// Decode every entry of a keyed object, keeping a result per key
pub fn decode_keyed<T, F>(map: &Map<String, Value>, mut decode_entry: F) -> HashMap<String, Result<T, DecodeError>>
where
    F: FnMut(&str, &Value) -> Result<T, DecodeError>,
{
    map.iter()
        .map(|(key, value)| (key.clone(), decode_entry(key, value)))
        .collect()
}

/// Keep the entries that decoded, logging the rest
pub fn collect_decoded<T>(entries: HashMap<String, Result<T, DecodeError>>, context: &str) -> HashMap<String, T> {
    entries
        .into_iter()
        .filter_map(|(key, entry)| match entry {
            Ok(value) => Some((key, value)),
            Err(err) => {
                debug!(context, key = %key, error = %err, "Skipping entry");
                None
            }
        })
        .collect()
}

/// Decode positional rows, skipping any row that fails
pub fn decode_rows<T, F>(rows: &[Value], context: &str, mut decode_row: F) -> Vec<T>
where
    F: FnMut(&Value) -> Result<T, DecodeError>,
{
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match decode_row(row) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(context, index, error = %err, "Skipping row");
                None
            }
        })
        .collect()
}

// ============================================================================
// Field decoders
// ============================================================================

pub(crate) fn object<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    value.as_object().ok_or_else(|| unexpected(field, "object"))
}

pub(crate) fn array<'a>(value: &'a Value, field: &str) -> Result<&'a [Value], DecodeError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| unexpected(field, "array"))
}

/// Positional array with exactly `len` elements
pub(crate) fn tuple<'a>(value: &'a Value, field: &str, len: usize) -> Result<&'a [Value], DecodeError> {
    let items = array(value, field)?;
    if items.len() != len {
        return Err(DecodeError::Length {
            field: field.to_string(),
            expected: len,
            actual: items.len(),
        });
    }
    Ok(items)
}

pub(crate) fn string<'a>(value: &'a Value, field: &str) -> Result<&'a str, DecodeError> {
    value.as_str().ok_or_else(|| unexpected(field, "string"))
}

/// Decimal sent either as a string or as a JSON number
pub(crate) fn decimal(value: &Value, field: &str) -> Result<Decimal, DecodeError> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => return Err(unexpected(field, "decimal")),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| DecodeError::InvalidDecimal {
            field: field.to_string(),
            value: text,
        })
}

/// Integer sent as a number or numeric string; fractional numbers truncate
pub(crate) fn integer(value: &Value, field: &str) -> Result<i64, DecodeError> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| unexpected(field, "integer")),
        Value::String(text) => text.trim().parse().map_err(|_| unexpected(field, "integer")),
        _ => Err(unexpected(field, "integer")),
    }
}

/// Whole Unix seconds
pub(crate) fn unix_seconds(value: &Value, field: &str) -> Result<DateTime<Utc>, DecodeError> {
    let seconds = integer(value, field)?;
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| invalid_timestamp(field))
}

/// Unix nanoseconds, as used by the `Trades` pagination cursor
pub(crate) fn unix_nanos(value: &Value, field: &str) -> Result<DateTime<Utc>, DecodeError> {
    let nanos = integer(value, field)?;
    let seconds = nanos.div_euclid(1_000_000_000);
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;
    DateTime::from_timestamp(seconds, subsec).ok_or_else(|| invalid_timestamp(field))
}

/// `seconds.fraction` timestamp, see [`TimestampScale`]
pub(crate) fn fractional_timestamp(
    value: &Value,
    field: &str,
    scale: TimestampScale,
) -> Result<DateTime<Utc>, DecodeError> {
    let raw = decimal(value, field)?;
    let whole = raw.floor();
    let fraction = raw - whole;

    let seconds = whole.to_i64().ok_or_else(|| invalid_timestamp(field))?;
    let nanos = match scale {
        TimestampScale::TenThousand => (fraction * Decimal::from(10_000)).trunc().to_u32(),
        TimestampScale::Microseconds => (fraction * Decimal::from(1_000_000))
            .trunc()
            .to_u32()
            .map(|micros| micros * 1_000),
    }
    .ok_or_else(|| invalid_timestamp(field))?;

    DateTime::from_timestamp(seconds, nanos).ok_or_else(|| invalid_timestamp(field))
}

fn unexpected(field: &str, expected: &'static str) -> DecodeError {
    DecodeError::UnexpectedType {
        field: field.to_string(),
        expected,
    }
}

fn invalid_timestamp(field: &str) -> DecodeError {
    DecodeError::InvalidTimestamp {
        field: field.to_string(),
    }
}

/// Permissive accessor over a JSON object
///
/// Absent or `null` fields yield zero values. A field that is present but
/// malformed is an error.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
    options: &'a DecodeOptions,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(value: &'a Value, field: &str, options: &'a DecodeOptions) -> Result<Self, DecodeError> {
        Ok(Self {
            map: object(value, field)?,
            options,
        })
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    pub(crate) fn string(&self, key: &str) -> String {
        self.opt_string(key).unwrap_or_default()
    }

    pub(crate) fn opt_string(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    pub(crate) fn decimal(&self, key: &str) -> Result<Decimal, DecodeError> {
        Ok(self.opt_decimal(key)?.unwrap_or_default())
    }

    pub(crate) fn opt_decimal(&self, key: &str) -> Result<Option<Decimal>, DecodeError> {
        self.get(key).map(|value| decimal(value, key)).transpose()
    }

    pub(crate) fn integer(&self, key: &str) -> Result<i64, DecodeError> {
        Ok(self.opt_integer(key)?.unwrap_or_default())
    }

    pub(crate) fn opt_integer(&self, key: &str) -> Result<Option<i64>, DecodeError> {
        self.get(key).map(|value| integer(value, key)).transpose()
    }

    /// Fractional timestamp; absent means the Unix epoch
    pub(crate) fn timestamp(&self, key: &str) -> Result<DateTime<Utc>, DecodeError> {
        Ok(self.opt_timestamp(key)?.unwrap_or_default())
    }

    /// Fractional timestamp; absent or zero means unset
    pub(crate) fn opt_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, DecodeError> {
        match self.get(key) {
            Some(value) if !is_zero(value) => {
                fractional_timestamp(value, key, self.options.timestamp_scale).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Whole-second timestamp; absent or zero means unset
    pub(crate) fn opt_unix_seconds(&self, key: &str) -> Result<Option<DateTime<Utc>>, DecodeError> {
        match self.get(key) {
            Some(value) if !is_zero(value) => unix_seconds(value, key).map(Some),
            _ => Ok(None),
        }
    }

    /// Positional array of a fixed length, if present
    pub(crate) fn tuple(&self, key: &str, len: usize) -> Result<Option<&'a [Value]>, DecodeError> {
        self.get(key).map(|value| tuple(value, key, len)).transpose()
    }

    pub(crate) fn object(&self, key: &str) -> Result<Option<Fields<'a>>, DecodeError> {
        self.get(key)
            .map(|value| Fields::new(value, key, self.options))
            .transpose()
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_non_200_status() {
        let result: RestResult<Value> = decode(503, Some(b"{}"), &DecodeOptions::default());
        assert!(matches!(result, Err(RestError::Http { status: 503 })));
    }

    #[test]
    fn test_status_checked_before_body() {
        let result: RestResult<Value> = decode(404, None, &DecodeOptions::default());
        assert!(matches!(result, Err(RestError::Http { status: 404 })));
    }

    #[test]
    fn test_empty_body() {
        let options = DecodeOptions::default();
        let result: RestResult<Value> = decode(200, None, &options);
        assert!(matches!(result, Err(RestError::EmptyBody)));

        let result: RestResult<Value> = decode(200, Some(b""), &options);
        assert!(matches!(result, Err(RestError::EmptyBody)));
    }

    #[test]
    fn test_malformed_envelope() {
        let options = DecodeOptions::default();
        for body in [&b"not json"[..], br#"{"result":{}}"#, br#"{"error":"EGeneral"}"#, b"[]"] {
            let result: RestResult<Value> = decode(200, Some(body), &options);
            assert!(
                matches!(result, Err(RestError::MalformedEnvelope(_))),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_server_error_envelope() {
        let options = DecodeOptions::default();
        for body in [
            &br#"{"error":["EGeneral:Invalid arguments"],"result":null}"#[..],
            br#"{"error":["EGeneral:Invalid arguments"]}"#,
        ] {
            let result: RestResult<Value> = decode(200, Some(body), &options);
            match result {
                Err(RestError::Server { errors, .. }) => {
                    assert_eq!(errors, vec!["EGeneral:Invalid arguments".to_string()])
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_server_error_ignores_result() {
        let body = br#"{"error":["EQuery:Unknown asset pair"],"result":{"unixtime":1}}"#;
        let result: RestResult<Value> = decode(200, Some(body), &DecodeOptions::default());
        assert!(matches!(result, Err(RestError::Server { .. })));
    }

    #[test]
    fn test_success_passes_result() {
        let body = br#"{"error":[],"result":{"unixtime":1688669448}}"#;
        let result: Value = decode(200, Some(body), &DecodeOptions::default()).unwrap();
        assert_eq!(result["unixtime"], 1688669448);
    }

    #[test]
    fn test_decimal_from_string_and_number() {
        assert_eq!(decimal(&json!("30306.10000"), "p").unwrap(), dec!(30306.10000));
        assert_eq!(decimal(&json!(0.26), "p").unwrap(), dec!(0.26));
        assert_eq!(decimal(&json!(50000), "p").unwrap(), dec!(50000));
        assert!(matches!(
            decimal(&json!("abc"), "p"),
            Err(DecodeError::InvalidDecimal { .. })
        ));
        assert!(matches!(
            decimal(&json!([]), "p"),
            Err(DecodeError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn test_integer_forms() {
        assert_eq!(integer(&json!(42), "n").unwrap(), 42);
        assert_eq!(integer(&json!(42.9), "n").unwrap(), 42);
        assert_eq!(integer(&json!("1688671969123456789"), "n").unwrap(), 1688671969123456789);
        assert!(integer(&json!(true), "n").is_err());
    }

    #[test]
    fn test_tuple_length() {
        assert!(tuple(&json!(["1", "2", "3"]), "a", 3).is_ok());
        assert_eq!(
            tuple(&json!(["1", "2"]), "a", 3),
            Err(DecodeError::Length {
                field: "a".to_string(),
                expected: 3,
                actual: 2,
            })
        );
    }

    // Kraken's fractional timestamp encoding is ambiguous; both readings are
    // pinned here so a change of default is a deliberate decision.
    #[test]
    fn test_fractional_timestamp_ten_thousand_scale() {
        let time = fractional_timestamp(&json!(1688669448.5), "opentm", TimestampScale::TenThousand).unwrap();
        assert_eq!(time.timestamp(), 1688669448);
        assert_eq!(time.nanosecond(), 5_000);

        let time = fractional_timestamp(&json!(1688669448.1234), "time", TimestampScale::TenThousand).unwrap();
        assert_eq!(time.timestamp(), 1688669448);
        assert_eq!(time.nanosecond(), 1_234);
    }

    #[test]
    fn test_fractional_timestamp_microsecond_scale() {
        let time = fractional_timestamp(&json!(1688669448.5), "opentm", TimestampScale::Microseconds).unwrap();
        assert_eq!(time.timestamp(), 1688669448);
        assert_eq!(time.nanosecond(), 500_000_000);

        let time = fractional_timestamp(&json!(1688669448.123456), "time", TimestampScale::Microseconds).unwrap();
        assert_eq!(time.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_whole_second_timestamp_scale_independent() {
        for scale in [TimestampScale::TenThousand, TimestampScale::Microseconds] {
            let time = fractional_timestamp(&json!(1688669448), "closetm", scale).unwrap();
            assert_eq!(time.timestamp(), 1688669448);
            assert_eq!(time.nanosecond(), 0);
        }
    }

    #[test]
    fn test_unix_nanos() {
        let time = unix_nanos(&json!("1688671969123456789"), "last").unwrap();
        assert_eq!(time.timestamp(), 1688671969);
        assert_eq!(time.nanosecond(), 123_456_789);
    }

    #[test]
    fn test_fields_permissive_defaults() {
        let value = json!({"vol": "1.5", "userref": null, "opentm": 0});
        let options = DecodeOptions::default();
        let fields = Fields::new(&value, "order", &options).unwrap();

        assert_eq!(fields.decimal("vol").unwrap(), dec!(1.5));
        assert_eq!(fields.decimal("cost").unwrap(), Decimal::ZERO);
        assert_eq!(fields.opt_integer("userref").unwrap(), None);
        assert_eq!(fields.opt_timestamp("opentm").unwrap(), None);
        assert_eq!(fields.string("status"), "");
    }

    #[test]
    fn test_fields_present_but_invalid() {
        let value = json!({"vol": "lots"});
        let options = DecodeOptions::default();
        let fields = Fields::new(&value, "order", &options).unwrap();
        assert!(fields.decimal("vol").is_err());
    }

    #[test]
    fn test_decode_rows_skips_failures() {
        let rows = vec![json!(["1.0"]), json!(["bad"]), json!(["2.0"])];
        let decoded = decode_rows(&rows, "test", |row| decimal(&array(row, "row")?[0], "price"));
        assert_eq!(decoded, vec![dec!(1.0), dec!(2.0)]);
    }

    #[test]
    fn test_decode_keyed_isolates_keys() {
        let value = json!({"XXBT": "1.0", "ZUSD": "oops"});
        let map = value.as_object().unwrap();

        let entries = decode_keyed(map, |key, value| decimal(value, key));
        assert_eq!(entries["XXBT"], Ok(dec!(1.0)));
        assert!(entries["ZUSD"].is_err());

        let kept = collect_decoded(entries, "balance");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept["XXBT"], dec!(1.0));
    }
}
