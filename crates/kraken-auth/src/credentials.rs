//! Authentication credentials for Kraken API
//!
//! Implements HMAC-SHA512 signing as required by Kraken's private endpoints.
//!
//! # Security
//!
//! The API secret is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`
//!
//! The secret stays in its base64 form until a request is signed, so a
//! malformed secret surfaces as [`AuthError::InvalidSecret`] on the call
//! that needs it.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256, Sha512};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AuthError, AuthResult};

type HmacSha512 = Hmac<Sha512>;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "KRAKEN_API_KEY";
/// Environment variable holding the base64 API secret
pub const API_SECRET_ENV: &str = "KRAKEN_PRIVATE_KEY";

/// API credentials for authenticated requests
pub struct Credentials {
    /// API key (public)
    api_key: String,
    /// API secret, base64 encoded as issued by Kraken
    secret: SecretString,
}

impl Credentials {
    /// Create new credentials from API key and base64 secret
    ///
    /// No validation happens here; see [`Credentials::ensure_complete`].
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Create credentials from environment variables
    ///
    /// Reads `KRAKEN_API_KEY` and `KRAKEN_PRIVATE_KEY` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(API_KEY_ENV.to_string()))?;
        let secret = std::env::var(API_SECRET_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(API_SECRET_ENV.to_string()))?;

        Ok(Self::new(api_key, secret))
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Fail with [`AuthError::MissingCredentials`] unless both key and secret are set
    pub fn ensure_complete(&self) -> AuthResult<()> {
        if self.api_key.is_empty() {
            return Err(AuthError::MissingCredentials("API key is empty"));
        }
        if self.secret.expose_secret().is_empty() {
            return Err(AuthError::MissingCredentials("API secret is empty"));
        }
        Ok(())
    }

    /// Current wall-clock time in milliseconds, used as the request nonce
    ///
    /// Kraken rejects a nonce that is not larger than the previous one seen
    /// for the same key. Callers sharing a key across threads must not let
    /// two requests built in the same millisecond reach the server out of
    /// order.
    pub fn generate_nonce() -> AuthResult<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .map_err(|e| AuthError::Clock(e.to_string()))
    }

    /// Sign a request for Kraken's API
    ///
    /// Kraken signature algorithm:
    /// 1. SHA256(nonce + POST_data)
    /// 2. HMAC-SHA512(base64_decode(secret), uri_path + SHA256_result)
    /// 3. Base64 encode result
    ///
    /// # Arguments
    /// * `path` - API endpoint path (e.g., "/0/private/Balance")
    /// * `nonce` - Nonce included in `post_data`
    /// * `post_data` - URL-encoded POST body
    pub fn sign(&self, path: &str, nonce: &str, post_data: &str) -> AuthResult<String> {
        let key = BASE64
            .decode(self.secret.expose_secret())
            .map_err(|e| AuthError::InvalidSecret(e.to_string()))?;

        let mut sha256 = Sha256::new();
        sha256.update(nonce.as_bytes());
        sha256.update(post_data.as_bytes());
        let digest = sha256.finalize();

        let mut mac =
            HmacSha512::new_from_slice(&key).map_err(|e| AuthError::Crypto(e.to_string()))?;
        mac.update(path.as_bytes());
        mac.update(&digest);

        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            secret: SecretString::from(self.secret.expose_secret().to_string()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.api_key.chars().take(8).collect();
        f.debug_struct("Credentials")
            .field("api_key", &format!("{}...", prefix))
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Signs one private request: fixes the path and nonce, then signs the body
#[derive(Debug)]
pub struct RequestSigner<'a> {
    credentials: &'a Credentials,
    path: String,
    nonce: String,
}

impl<'a> RequestSigner<'a> {
    /// Create a signer with a fresh wall-clock nonce
    pub fn new(credentials: &'a Credentials, path: impl Into<String>) -> AuthResult<Self> {
        let nonce = Credentials::generate_nonce()?;
        Ok(Self::with_nonce(credentials, path, nonce))
    }

    /// Create a signer with an explicit nonce
    pub fn with_nonce(credentials: &'a Credentials, path: impl Into<String>, nonce: u64) -> Self {
        Self {
            credentials,
            path: path.into(),
            nonce: nonce.to_string(),
        }
    }

    /// Get the nonce for this request
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Get the signed path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Sign the request with the given POST data
    pub fn sign(&self, post_data: &str) -> AuthResult<String> {
        self.credentials.sign(&self.path, &self.nonce, post_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC_SECRET: &str =
        "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";

    #[test]
    fn test_nonce_is_millis() {
        let nonce = Credentials::generate_nonce().unwrap();
        // 2020-09-13 in milliseconds; any real clock is past this
        assert!(nonce > 1_600_000_000_000);
    }

    #[test]
    fn test_nonce_non_decreasing() {
        let first = Credentials::generate_nonce().unwrap();
        let second = Credentials::generate_nonce().unwrap();
        assert!(second >= first);
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("test_api_key", "dGVzdF9wcml2YXRlX2tleQ==");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("dGVzdF9wcml2YXRlX2tleQ=="));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_ensure_complete() {
        assert!(Credentials::new("key", "c2VjcmV0").ensure_complete().is_ok());
        assert!(matches!(
            Credentials::new("", "c2VjcmV0").ensure_complete(),
            Err(AuthError::MissingCredentials(_))
        ));
        assert!(matches!(
            Credentials::new("key", "").ensure_complete(),
            Err(AuthError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_documented_signature_vector() {
        let creds = Credentials::new("API_KEY", DOC_SECRET);
        let signature = creds
            .sign(
                "/0/private/AddOrder",
                "1616492376594",
                "nonce=1616492376594&ordertype=limit&pair=XBTUSD&price=37500&type=buy&volume=1.25",
            )
            .unwrap();

        assert_eq!(
            signature,
            "4/dpxb3iT4tp/ZCVEwSnEsLxx0bqyhLpdfOpc6fn7OR8+UClSV5n9E6aSS8MPtnRfp32bAb0nmbRn6H8ndwLUQ=="
        );
    }

    #[test]
    fn test_signing_consistency() {
        let creds = Credentials::new("API_KEY", DOC_SECRET);
        let sign = |path: &str, nonce: &str, body: &str| creds.sign(path, nonce, body).unwrap();

        let base = sign("/0/private/Balance", "1616492376594", "nonce=1616492376594");
        assert_eq!(
            base,
            sign("/0/private/Balance", "1616492376594", "nonce=1616492376594")
        );

        // Each input participates in the signature
        assert_ne!(
            base,
            sign("/0/private/TradeBalance", "1616492376594", "nonce=1616492376594")
        );
        assert_ne!(
            base,
            sign("/0/private/Balance", "1616492376595", "nonce=1616492376594")
        );
        assert_ne!(
            base,
            sign("/0/private/Balance", "1616492376594", "nonce=1616492376595")
        );

        let other = Credentials::new("API_KEY", "c2VjcmV0");
        assert_ne!(
            base,
            other
                .sign("/0/private/Balance", "1616492376594", "nonce=1616492376594")
                .unwrap()
        );
    }

    #[test]
    fn test_invalid_base64_secret() {
        let creds = Credentials::new("API_KEY", "not base64!!");
        let result = creds.sign("/0/private/Balance", "1", "nonce=1");
        assert!(matches!(result, Err(AuthError::InvalidSecret(_))));
    }

    #[test]
    fn test_request_signer_uses_fixed_nonce() {
        let creds = Credentials::new("API_KEY", DOC_SECRET);
        let signer = RequestSigner::with_nonce(&creds, "/0/private/Balance", 42);

        assert_eq!(signer.nonce(), "42");
        assert_eq!(signer.path(), "/0/private/Balance");
        assert_eq!(signer.api_key(), "API_KEY");
        assert_eq!(
            signer.sign("nonce=42").unwrap(),
            creds.sign("/0/private/Balance", "42", "nonce=42").unwrap()
        );
    }
}
