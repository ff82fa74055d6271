//! Error types for REST API operations

use kraken_auth::AuthError;
use kraken_types::error_codes::{KrakenApiError, RecoveryStrategy};

use crate::transport::TransportError;

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Private endpoint called without usable credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Signature could not be computed
    #[error("Signing error: {0}")]
    Signing(AuthError),

    /// Request never produced a response
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-200 HTTP status
    #[error("HTTP status {status}")]
    Http {
        /// Status code returned by the server
        status: u16,
    },

    /// Response had no body
    #[error("Empty response body")]
    EmptyBody,

    /// Body is not a JSON `{error, result}` envelope
    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    /// Envelope carried a non-empty error list
    #[error("Server error: {}", .errors.join(", "))]
    Server {
        /// Error strings exactly as returned by Kraken
        errors: Vec<String>,
        /// Classification of the first error string
        error: KrakenApiError,
    },

    /// Result payload did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Invalid request parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl RestError {
    /// Create a server error from error strings returned by Kraken
    pub fn from_api_errors(errors: Vec<String>) -> Self {
        let error = KrakenApiError::parse(errors.first().map(String::as_str).unwrap_or("Unknown error"));
        Self::Server { errors, error }
    }

    /// Get the recovery strategy for this error
    ///
    /// The client never retries on its own; this only informs caller policy.
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            Self::Server { error, .. } => error.recovery_strategy(),
            Self::Transport(TransportError::Client(_)) => RecoveryStrategy::Fatal,
            Self::Transport(_) => RecoveryStrategy::Retry {
                max_attempts: 3,
                delay_ms: 1000,
            },
            Self::Http { status } if *status == 429 => RecoveryStrategy::rate_limit_backoff(),
            Self::Http { status } if *status >= 500 => RecoveryStrategy::service_retry(),
            Self::Http { .. } => RecoveryStrategy::Manual,
            Self::Configuration(_) | Self::Signing(_) => RecoveryStrategy::Fatal,
            Self::EmptyBody | Self::MalformedEnvelope(_) | Self::Decode(_) => RecoveryStrategy::Manual,
            Self::InvalidParameter(_) => RecoveryStrategy::Fatal,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.recovery_strategy().allows_retry()
    }

    /// Check if this error indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Server { error, .. } => error.is_rate_limit(),
            Self::Http { status } => *status == 429,
            _ => false,
        }
    }

    /// Error strings from the envelope, if this is a server error
    pub fn server_messages(&self) -> Option<&[String]> {
        match self {
            Self::Server { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

impl From<AuthError> for RestError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials(_) | AuthError::EnvVarNotSet(_) => {
                Self::Configuration(err.to_string())
            }
            other => Self::Signing(other),
        }
    }
}

/// Field-level decode failures
///
/// These stay scoped to the entry being decoded: a bad row or a bad pair is
/// skipped or reported per key, see [`crate::decode`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Positional array has the wrong number of elements
    #[error("{field}: expected {expected} elements, got {actual}")]
    Length {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// JSON value has the wrong type
    #[error("{field}: expected {expected}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
    },

    /// String is not a decimal number
    #[error("{field}: invalid decimal '{value}'")]
    InvalidDecimal { field: String, value: String },

    /// Number cannot be turned into a timestamp
    #[error("{field}: timestamp out of range")]
    InvalidTimestamp { field: String },

    /// Shape decoded through serde failed
    #[error("{0}")]
    Json(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kraken_types::KrakenErrorCode;

    #[test]
    fn test_parse_api_error() {
        let err = RestError::from_api_errors(vec!["EAPI:Rate limit exceeded".to_string()]);
        assert!(err.is_rate_limited());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_server_error_keeps_messages() {
        let err = RestError::from_api_errors(vec![
            "EGeneral:Invalid arguments".to_string(),
            "EQuery:Unknown asset pair".to_string(),
        ]);

        assert_eq!(
            err.server_messages(),
            Some(&["EGeneral:Invalid arguments".to_string(), "EQuery:Unknown asset pair".to_string()][..])
        );
        assert_eq!(
            err.to_string(),
            "Server error: EGeneral:Invalid arguments, EQuery:Unknown asset pair"
        );
        match err {
            RestError::Server { error, .. } => {
                assert_eq!(error.code, Some(KrakenErrorCode::InvalidArguments))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_recovery_strategies() {
        assert!(RestError::Transport(TransportError::Timeout).is_retryable());
        assert!(RestError::Http { status: 503 }.is_retryable());
        assert!(RestError::Http { status: 429 }.is_rate_limited());
        assert!(!RestError::Http { status: 404 }.is_retryable());
        assert!(!RestError::Configuration("no key".into()).is_retryable());
        assert!(!RestError::EmptyBody.is_retryable());
    }

    #[test]
    fn test_transport_recovery() {
        for err in [
            TransportError::Timeout,
            TransportError::Connect("refused".into()),
            TransportError::Request("reset".into()),
        ] {
            assert_eq!(
                RestError::Transport(err).recovery_strategy(),
                RecoveryStrategy::Retry {
                    max_attempts: 3,
                    delay_ms: 1000,
                }
            );
        }
        assert!(!RestError::Transport(TransportError::Client("tls".into())).is_retryable());
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: RestError = AuthError::MissingCredentials("API key is empty").into();
        assert!(matches!(err, RestError::Configuration(_)));

        let err: RestError = AuthError::InvalidSecret("bad padding".into()).into();
        assert!(matches!(err, RestError::Signing(AuthError::InvalidSecret(_))));
    }
}
