use super::*;

fn status_failure(status: u16, body: &str) -> NormalizedError {
    NormalizedError::from_failure(GatewayFailure::Status { status, body: body.to_owned() })
}

// =============================================================
// Message precedence
// =============================================================

#[test]
fn structured_message_field_wins() {
    let err = status_failure(400, r#"{"message":"X","error":"ignored"}"#);
    assert_eq!(err.friendly_message(), "X");
    assert_eq!(err.status_code(), Some(400));
}

#[test]
fn json_string_body_is_used_verbatim() {
    let err = status_failure(409, r#""Email already registered""#);
    assert_eq!(err.friendly_message(), "Email already registered");
}

#[test]
fn plain_text_body_is_used_verbatim() {
    let err = status_failure(502, "Bad Gateway");
    assert_eq!(err.friendly_message(), "Bad Gateway");
}

#[test]
fn empty_message_field_falls_through_to_status() {
    let err = status_failure(422, r#"{"message":""}"#);
    assert_eq!(err.friendly_message(), "Request failed with status 422");
}

#[test]
fn object_without_message_falls_through_to_status() {
    let err = status_failure(500, r#"{"error":"boom"}"#);
    assert_eq!(err.friendly_message(), "Request failed with status 500");
}

#[test]
fn status_only_synthesizes_message() {
    let err = status_failure(404, "");
    assert_eq!(err.friendly_message(), "Request failed with status 404");
}

#[test]
fn transport_failure_uses_generic_fallback() {
    let err = NormalizedError::from_failure(GatewayFailure::Transport(TransportError::Request {
        url: "http://localhost:3001/api/notes".to_owned(),
        message: "connection refused".to_owned(),
    }));
    assert_eq!(err.friendly_message(), FALLBACK_MESSAGE);
    assert_eq!(err.status_code(), None);
    assert!(matches!(err.raw(), GatewayFailure::Transport(_)));
}

#[test]
fn decode_failure_reports_status_not_body() {
    let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err = NormalizedError::from_failure(GatewayFailure::Decode { status: 200, source });
    assert_eq!(err.friendly_message(), "Request failed with status 200");
}

#[test]
fn invalid_response_uses_generic_fallback() {
    let err = NormalizedError::from_failure(GatewayFailure::InvalidResponse("missing token".to_owned()));
    assert_eq!(err.friendly_message(), FALLBACK_MESSAGE);
}

// =============================================================
// Error trait surface
// =============================================================

#[test]
fn display_is_friendly_message_and_source_is_raw() {
    let err = status_failure(401, r#"{"message":"Invalid credentials"}"#);
    assert_eq!(err.to_string(), "Invalid credentials");
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("server responded with status 401"));
}

#[test]
fn unauthorized_statuses_are_flagged() {
    assert!(status_failure(401, "").is_unauthorized());
    assert!(status_failure(403, "").is_unauthorized());
    assert!(!status_failure(500, "").is_unauthorized());
}
