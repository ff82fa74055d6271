//! Credentials and request signing for Kraken's private REST endpoints
//!
//! # Example
//!
//! ```no_run
//! use kraken_auth::{Credentials, RequestSigner};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load credentials from environment
//!     let creds = Credentials::from_env()?;
//!     creds.ensure_complete()?;
//!
//!     // Sign the body of a Balance request
//!     let signer = RequestSigner::new(&creds, "/0/private/Balance")?;
//!     let body = format!("nonce={}", signer.nonce());
//!     let signature = signer.sign(&body)?;
//!     println!("API-Sign: {}", signature);
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;

pub use credentials::{Credentials, RequestSigner, API_KEY_ENV, API_SECRET_ENV};
pub use error::{AuthError, AuthResult};
