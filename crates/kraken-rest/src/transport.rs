//! HTTP transport seam
//!
//! The client hands a fully built [`HttpRequest`] to a [`Transport`] and gets
//! back the raw status and body. Timeouts and connection handling belong to
//! the transport; nothing above it retries.

use reqwest::blocking::Client;
use reqwest::Method;
use std::time::Duration;
use tracing::debug;

/// A request ready to be put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response as returned by the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// `None` when the server sent no body
    pub body: Option<Vec<u8>>,
}

impl HttpResponse {
    /// 200 response with the given body
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }
}

/// Failures below the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Could not reach the server
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other failure while sending or reading
    #[error("Request failed: {0}")]
    Request(String),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Sends one request and returns the raw response
///
/// Implementations must be usable from several threads at once.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body.clone()).send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let bytes = response.bytes()?;

        debug!(status, len = bytes.len(), "Received response");

        Ok(HttpResponse {
            status,
            headers,
            body: (!bytes.is_empty()).then(|| bytes.to_vec()),
        })
    }
}
