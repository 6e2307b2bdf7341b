//! HTTP transport seam beneath the request gateway.
//!
//! The gateway builds fully-resolved [`HttpRequest`]s and hands them to an
//! [`HttpTransport`]. Production uses [`ReqwestTransport`]; tests script
//! responses through a mock implementation.

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Transport-level failure: no usable response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("could not read response body: {0}")]
    Body(String),
}

/// A resolved outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL (or the configured base when the endpoint was empty).
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes resolved requests. Enables mocking in tests.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return whatever response arrives, success or not.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] only when no response could be obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an already-configured client (proxies, TLS roots, timeouts).
    #[must_use]
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest { method, url, headers, body } = request;
        let mut builder = self.http.request(method, &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request { url: url.clone(), message: e.to_string() })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
