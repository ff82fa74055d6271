//! Kraken REST error-string classification with recovery hints
//!
//! Kraken reports failures as strings of the form
//! `<severity><category>:<message>[:<extra>]`, e.g. `EGeneral:Invalid arguments`
//! or `EGeneral:Invalid arguments:Index unavailable`. The client surfaces
//! those strings verbatim; this module only classifies them so callers can
//! pick a retry policy.

use std::time::Duration;

/// Recovery strategy for handling API errors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecoveryStrategy {
    /// Exponential backoff before retry
    Backoff {
        initial_ms: u64,
        max_ms: u64,
        multiplier: u32,
    },
    /// Fixed delay retry
    Retry { delay_ms: u64, max_attempts: u32 },
    /// Credentials or nonce must be fixed before retrying
    Reauthenticate,
    /// Cannot recover programmatically
    Fatal,
    /// Requires user intervention (e.g. fix a request parameter)
    UserAction { message: &'static str },
    /// Manual investigation needed
    #[default]
    Manual,
}

impl RecoveryStrategy {
    /// Default exponential backoff for rate limits
    pub fn rate_limit_backoff() -> Self {
        Self::Backoff {
            initial_ms: 1000,
            max_ms: 60000,
            multiplier: 2,
        }
    }

    /// Default retry for transient service errors
    pub fn service_retry() -> Self {
        Self::Retry {
            delay_ms: 5000,
            max_attempts: 3,
        }
    }

    /// Get the initial delay duration
    pub fn initial_delay(&self) -> Option<Duration> {
        match self {
            Self::Backoff { initial_ms, .. } => Some(Duration::from_millis(*initial_ms)),
            Self::Retry { delay_ms, .. } => Some(Duration::from_millis(*delay_ms)),
            _ => None,
        }
    }

    /// Check if this strategy allows retry
    pub fn allows_retry(&self) -> bool {
        matches!(
            self,
            Self::Backoff { .. } | Self::Retry { .. } | Self::Reauthenticate
        )
    }
}

/// Kraken API error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// EAPI:* errors - API-level issues
    Api,
    /// EGeneral:* errors - General errors
    General,
    /// EService:* errors - Service availability
    Service,
    /// EOrder:* errors - Order errors
    Order,
    /// EQuery:* errors - Query/search errors
    Query,
    /// Unknown error category
    Unknown,
}

impl ErrorCategory {
    fn from_prefix(prefix: &str) -> Self {
        // Severity is the leading character ('E' error, 'W' warning)
        match prefix.get(1..) {
            Some("API") => Self::Api,
            Some("General") => Self::General,
            Some("Service") => Self::Service,
            Some("Order") => Self::Order,
            Some("Query") => Self::Query,
            _ => Self::Unknown,
        }
    }
}

/// Parsed Kraken API error with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KrakenApiError {
    /// Error string as sent by Kraken
    pub raw: String,
    /// Parsed error code (if recognized)
    pub code: Option<KrakenErrorCode>,
    /// Error category
    pub category: ErrorCategory,
    /// Message part after the category prefix
    pub message: String,
    /// Extra info after a second colon, if any
    pub extra: Option<String>,
}

impl KrakenApiError {
    /// Parse a Kraken error string into a structured error
    pub fn parse(error: &str) -> Self {
        let mut parts = error.splitn(3, ':');
        let prefix = parts.next().unwrap_or_default();

        match parts.next() {
            Some(message) => {
                let message = message.trim().to_string();
                let extra = parts.next().map(|s| s.trim().to_string());
                let category = ErrorCategory::from_prefix(prefix);
                let code = KrakenErrorCode::parse(category, &message);

                Self {
                    raw: error.to_string(),
                    code,
                    category,
                    message,
                    extra,
                }
            }
            None => Self {
                raw: error.to_string(),
                code: None,
                category: ErrorCategory::Unknown,
                message: error.to_string(),
                extra: None,
            },
        }
    }

    /// Parse every entry of an envelope's error list
    pub fn parse_many(errors: &[String]) -> Vec<Self> {
        errors.iter().map(|e| Self::parse(e)).collect()
    }

    /// Get the recovery strategy for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self.code {
            Some(code) => code.recovery_strategy(),
            None if self.category == ErrorCategory::Service => RecoveryStrategy::service_retry(),
            None => RecoveryStrategy::Manual,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.recovery_strategy().allows_retry()
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        self.code.map(|c| c.is_rate_limit()).unwrap_or(false)
    }

    /// Check if this error requires fixing credentials or nonce
    pub fn requires_reauth(&self) -> bool {
        matches!(self.recovery_strategy(), RecoveryStrategy::Reauthenticate)
    }
}

/// Known Kraken error codes for the market-data and account-query endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KrakenErrorCode {
    /// EAPI:Rate limit exceeded
    RateLimitExceeded,
    /// EAPI:Invalid key
    InvalidKey,
    /// EAPI:Invalid signature
    InvalidSignature,
    /// EAPI:Invalid nonce
    InvalidNonce,
    /// EAPI:Bad request
    BadRequest,
    /// EAPI:Feature disabled
    FeatureDisabled,
    /// EGeneral:Invalid arguments
    InvalidArguments,
    /// EGeneral:Permission denied
    PermissionDenied,
    /// EGeneral:Unknown asset pair / EQuery:Unknown asset pair
    UnknownAssetPair,
    /// EGeneral:Unknown asset
    UnknownAsset,
    /// EGeneral:Too many requests
    TooManyRequests,
    /// EGeneral:Temporary lockout
    TemporaryLockout,
    /// EGeneral:Unknown method
    UnknownMethod,
    /// EGeneral:Internal error
    InternalError,
    /// EService:Unavailable
    ServiceUnavailable,
    /// EService:Busy
    ServiceBusy,
    /// EService:Deadline elapsed
    DeadlineElapsed,
    /// EService:Timeout
    ServiceTimeout,
    /// EOrder:Unknown order
    UnknownOrder,
    /// EOrder:Rate limit exceeded
    OrderRateLimitExceeded,
}

impl KrakenErrorCode {
    /// Match the message part of an error string within its category
    pub fn parse(category: ErrorCategory, message: &str) -> Option<Self> {
        use ErrorCategory::*;

        Some(match (category, message) {
            (Api, "Rate limit exceeded") => Self::RateLimitExceeded,
            (Api, "Invalid key") => Self::InvalidKey,
            (Api, "Invalid signature") => Self::InvalidSignature,
            (Api, "Invalid nonce") => Self::InvalidNonce,
            (Api, "Bad request") => Self::BadRequest,
            (Api, "Feature disabled") => Self::FeatureDisabled,
            (General, "Invalid arguments") => Self::InvalidArguments,
            (General, "Permission denied") => Self::PermissionDenied,
            (General, "Unknown asset pair") | (Query, "Unknown asset pair") => {
                Self::UnknownAssetPair
            }
            (General, "Unknown asset") => Self::UnknownAsset,
            (General, "Too many requests") => Self::TooManyRequests,
            (General, "Temporary lockout") => Self::TemporaryLockout,
            (General, "Unknown method") => Self::UnknownMethod,
            (General, "Internal error") => Self::InternalError,
            (Service, "Unavailable") => Self::ServiceUnavailable,
            (Service, "Busy") => Self::ServiceBusy,
            (Service, "Deadline elapsed") => Self::DeadlineElapsed,
            (Service, "Timeout") => Self::ServiceTimeout,
            (Order, "Unknown order") => Self::UnknownOrder,
            (Order, "Rate limit exceeded") => Self::OrderRateLimitExceeded,
            _ => return None,
        })
    }

    /// Check if this code signals rate limiting
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::TooManyRequests | Self::OrderRateLimitExceeded
        )
    }

    /// Get the recovery strategy for this code
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            Self::RateLimitExceeded | Self::TooManyRequests | Self::OrderRateLimitExceeded => {
                RecoveryStrategy::rate_limit_backoff()
            }
            Self::TemporaryLockout => RecoveryStrategy::Backoff {
                initial_ms: 60_000,
                max_ms: 900_000,
                multiplier: 2,
            },
            Self::InvalidKey | Self::InvalidSignature | Self::InvalidNonce => {
                RecoveryStrategy::Reauthenticate
            }
            Self::ServiceUnavailable | Self::ServiceBusy | Self::ServiceTimeout => {
                RecoveryStrategy::service_retry()
            }
            Self::DeadlineElapsed => RecoveryStrategy::Retry {
                delay_ms: 1000,
                max_attempts: 3,
            },
            Self::InvalidArguments | Self::BadRequest => RecoveryStrategy::UserAction {
                message: "Check request parameters",
            },
            Self::UnknownAssetPair | Self::UnknownAsset => RecoveryStrategy::UserAction {
                message: "Check the asset or pair name",
            },
            Self::UnknownOrder => RecoveryStrategy::UserAction {
                message: "Check the transaction ID",
            },
            Self::PermissionDenied | Self::FeatureDisabled => RecoveryStrategy::Fatal,
            Self::InternalError | Self::UnknownMethod => RecoveryStrategy::Manual,
        }
    }
}
