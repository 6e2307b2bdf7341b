//! Normalized request errors.
//!
//! DESIGN
//! ======
//! Every failure leaving the request gateway is a [`NormalizedError`]: an
//! optional status code, a non-empty user-facing message, and the underlying
//! [`GatewayFailure`] kept as the error source. Callers branch on the status
//! or show the message; they never see transport-specific error types.
//!
//! MESSAGE PRECEDENCE
//! ==================
//! 1. a non-empty `message` string in a JSON object body
//! 2. the body itself when it is a non-empty string (JSON string or plain text)
//! 3. `Request failed with status <code>` when a status is known
//! 4. [`FALLBACK_MESSAGE`]

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;
use thiserror::Error;

use crate::net::transport::TransportError;

pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

/// Raw cause behind a [`NormalizedError`].
#[derive(Debug, Error)]
pub enum GatewayFailure {
    /// No response was received.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
    /// A response arrived with a non-success status.
    #[error("server responded with status {status}")]
    Status { status: u16, body: String },
    /// A success response whose body did not match the expected shape.
    #[error("could not decode response with status {status}: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    /// The request body could not be serialized.
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    /// A decoded response broke a client-side invariant.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayFailure {
    /// Status code attached to this failure, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Transport(_) | Self::Encode(_) | Self::InvalidResponse(_) => None,
        }
    }

    fn error_body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

/// The single error shape observed by every caller of the gateway.
#[derive(Debug, Error)]
#[error("{friendly_message}")]
pub struct NormalizedError {
    status: Option<u16>,
    friendly_message: String,
    #[source]
    raw: GatewayFailure,
}

impl NormalizedError {
    /// Normalize a raw failure, selecting the friendly message by precedence.
    #[must_use]
    pub fn from_failure(raw: GatewayFailure) -> Self {
        let status = raw.status().filter(|code| *code != 0);
        let friendly_message = friendly_message(status, raw.error_body());
        Self { status, friendly_message, raw }
    }

    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status
    }

    /// Message suitable for showing to the user. Never empty.
    #[must_use]
    pub fn friendly_message(&self) -> &str {
        &self.friendly_message
    }

    #[must_use]
    pub fn raw(&self) -> &GatewayFailure {
        &self.raw
    }

    /// Whether the server rejected the credentials (401/403).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }
}

impl From<GatewayFailure> for NormalizedError {
    fn from(raw: GatewayFailure) -> Self {
        Self::from_failure(raw)
    }
}

fn friendly_message(status: Option<u16>, body: Option<&str>) -> String {
    if let Some(message) = body.and_then(message_from_body) {
        return message;
    }
    match status {
        Some(code) => status_message(code),
        None => FALLBACK_MESSAGE.to_owned(),
    }
}

fn message_from_body(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_owned),
        Ok(Value::String(text)) => Some(text).filter(|text| !text.is_empty()),
        Ok(_) => None,
        Err(_) => Some(body.to_owned()),
    }
}

fn status_message(status: u16) -> String {
    format!("Request failed with status {status}")
}
