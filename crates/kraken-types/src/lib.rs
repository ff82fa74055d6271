//! Shared types for the Kraken REST API
//!
//! This crate provides the value types used across the workspace. It has
//! minimal dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`Asset`], [`AssetPair`] - Currency and pair identifiers
//! - [`Side`], [`OrderType`], [`OrderStatus`] - Wire enums with explicit `Unknown` variants
//! - [`OrderFlag`], [`OrderMisc`], [`parse_flag_list`] - Comma-delimited flag lists
//! - [`OhlcInterval`], [`AssetClass`], [`PairInformation`], [`CloseTime`] - Request parameters
//! - [`KrakenApiError`], [`KrakenErrorCode`] - Classification of Kraken error strings

pub mod asset;
pub mod enums;
pub mod error_codes;
pub mod flags;

// Re-export commonly used types
pub use asset::*;
pub use enums::*;
pub use error_codes::*;
pub use flags::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
