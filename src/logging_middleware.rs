// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode.
//! Credential fields are masked before anything reaches the log.

use axum::body::to_bytes;
use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use serde_json::Value;
use tracing::{debug, enabled, Level};

const REDACTED: &str = "[REDACTED]";

/// JSON keys whose values never get logged
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "current_password",
    "new_password",
    "token",
    "reset_token",
];

/// Replaces sensitive values anywhere in a JSON document
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    *inner = Value::String(REDACTED.to_string());
                } else {
                    redact(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Body text safe to log; non-JSON bodies are summarized by length only
fn loggable_body(bytes: &[u8]) -> String {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut json) => {
            redact(&mut json);
            json.to_string()
        }
        Err(_) => format!("<{} bytes>", bytes.len()),
    }
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        debug!(
            method = %parts.method,
            uri = %parts.uri,
            request_body = %loggable_body(&bytes),
            "📥 Request"
        );
    }

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        debug!(
            status = %parts.status,
            response_body = %loggable_body(&bytes),
            "📤 Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_nested_credentials() {
        let mut body = json!({
            "email": "alice@example.com",
            "password": "hunter22",
            "session": { "token": "eyJ...", "expires_at": "2024-01-01" },
            "items": [{ "reset_token": "abc" }]
        });
        redact(&mut body);

        assert_eq!(body["email"], "alice@example.com");
        assert_eq!(body["password"], REDACTED);
        assert_eq!(body["session"]["token"], REDACTED);
        assert_eq!(body["session"]["expires_at"], "2024-01-01");
        assert_eq!(body["items"][0]["reset_token"], REDACTED);
    }

    #[test]
    fn test_non_json_body_is_summarized() {
        assert_eq!(loggable_body(b"plain text"), "<10 bytes>");
    }
}
