//! Request gateway: the only component that performs outbound HTTP.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session and notes clients call the verb helpers here with relative API
//! paths. The gateway resolves the URL against the configured base, attaches
//! the bearer token read from [`PersistentTokenStore`], sends through the
//! [`HttpTransport`], and decodes JSON. It never touches session state.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-2xx responses, and undecodable bodies all funnel
//! through [`RequestGateway::send`] into a single [`NormalizedError`].

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{GatewayFailure, NormalizedError};
use crate::storage::token_store::PersistentTokenStore;

const AUTHORIZATION: &str = "Authorization";

/// Extra per-request options merged over the gateway defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header. A header with the same name as a default (including
    /// `Authorization`) replaces the default.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Resolve `endpoint` against `base`.
///
/// Empty endpoints yield the base unchanged; endpoints that already carry a
/// URI scheme (`https://...`) are used verbatim; everything else is joined with
/// exactly one `/`.
#[must_use]
pub fn build_url(base: &str, endpoint: &str) -> String {
    if endpoint.is_empty() {
        return base.to_owned();
    }
    if has_scheme(endpoint) {
        return endpoint.to_owned();
    }
    format!("{}/{}", base.trim_end_matches('/'), endpoint.trim_start_matches('/'))
}

fn has_scheme(endpoint: &str) -> bool {
    let Some((scheme, _)) = endpoint.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Shared handle; clones dispatch through the same transport and token slot.
#[derive(Clone)]
pub struct RequestGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    tokens: PersistentTokenStore,
}

impl RequestGateway {
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>, tokens: PersistentTokenStore) -> Self {
        Self { inner: Arc::new(GatewayInner { base_url: base_url.into(), transport, tokens }) }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// `GET endpoint`, decoding the JSON response into `T`.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizedError`] for any transport, status, or decode failure.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, NormalizedError> {
        self.get_with(endpoint, &RequestOptions::default()).await
    }

    /// `GET` with extra request options.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizedError`] for any transport, status, or decode failure.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<T, NormalizedError> {
        self.send(Method::GET, endpoint, None, options).await
    }

    /// `POST endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizedError`] for any encode, transport, status, or decode failure.
    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, NormalizedError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post_with(endpoint, body, &RequestOptions::default()).await
    }

    /// `POST` with extra request options.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizedError`] for any encode, transport, status, or decode failure.
    pub async fn post_with<T, B>(&self, endpoint: &str, body: &B, options: &RequestOptions) -> Result<T, NormalizedError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode(body)?;
        self.send(Method::POST, endpoint, Some(body), options).await
    }

    /// `PUT endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizedError`] for any encode, transport, status, or decode failure.
    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, NormalizedError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put_with(endpoint, body, &RequestOptions::default()).await
    }

    /// `PUT` with extra request options.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizedError`] for any encode, transport, status, or decode failure.
    pub async fn put_with<T, B>(&self, endpoint: &str, body: &B, options: &RequestOptions) -> Result<T, NormalizedError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode(body)?;
        self.send(Method::PUT, endpoint, Some(body), options).await
    }

    /// `DELETE endpoint`. Empty response bodies decode as JSON `null`, so
    /// `T = ()` suits endpoints that return nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizedError`] for any transport, status, or decode failure.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, NormalizedError> {
        self.delete_with(endpoint, &RequestOptions::default()).await
    }

    /// `DELETE` with extra request options.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizedError`] for any transport, status, or decode failure.
    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<T, NormalizedError> {
        self.send(Method::DELETE, endpoint, None, options).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> Result<T, NormalizedError> {
        let request = self.build_request(method, endpoint, body, options);
        debug!(
            method = %request.method,
            url = %request.url,
            authenticated = request.header(AUTHORIZATION).is_some(),
            "dispatching request"
        );

        let result = match self.inner.transport.send(request).await {
            Ok(response) if response.is_success() => decode(response),
            Ok(response) => Err(GatewayFailure::Status { status: response.status, body: response.body }),
            Err(e) => Err(GatewayFailure::Transport(e)),
        };

        result.map_err(|failure| {
            let err = NormalizedError::from_failure(failure);
            warn!(
                status = ?err.status_code(),
                message = err.friendly_message(),
                error = %err.raw(),
                "request failed"
            );
            err
        })
    }

    fn build_request(&self, method: Method, endpoint: &str, body: Option<String>, options: &RequestOptions) -> HttpRequest {
        let mut headers = vec![("Accept".to_owned(), "application/json".to_owned())];
        if let Some(token) = self.inner.tokens.read() {
            headers.push((AUTHORIZATION.to_owned(), format!("Bearer {token}")));
        }
        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        HttpRequest { method, url: build_url(&self.inner.base_url, endpoint), headers, body }
    }
}

impl fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestGateway")
            .field("base_url", &self.inner.base_url)
            .field("tokens", &self.inner.tokens)
            .finish_non_exhaustive()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String, NormalizedError> {
    serde_json::to_string(body).map_err(|e| NormalizedError::from_failure(GatewayFailure::Encode(e)))
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, GatewayFailure> {
    let body = if response.body.trim().is_empty() { "null" } else { response.body.as_str() };
    serde_json::from_str(body).map_err(|source| GatewayFailure::Decode { status: response.status, source })
}
