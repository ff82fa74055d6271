//! Error types for authentication operations

/// Errors that can occur while preparing or signing a private request
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// API key or secret missing for a private endpoint
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// API secret is not valid base64
    #[error("Invalid API secret: {0}")]
    InvalidSecret(String),

    /// HMAC could not be keyed
    #[error("Signing failed: {0}")]
    Crypto(String),

    /// System clock is before the Unix epoch
    #[error("Cannot read nonce clock: {0}")]
    Clock(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::EnvVarNotSet("KRAKEN_API_KEY".to_string());
        assert!(err.to_string().contains("KRAKEN_API_KEY"));

        let err = AuthError::MissingCredentials("API key is empty");
        assert_eq!(err.to_string(), "Missing credentials: API key is empty");
    }
}
