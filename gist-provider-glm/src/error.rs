//! Configuration errors, and classification of failed GLM responses.
//!
//! A rejected request comes back with a JSON body like
//! `{"error":{"code":"1113","message":"..."}}`. The message (and code) is what
//! ends up in the consumer's diagnostic token.

use std::time::Duration;

use gist_stream::TransportError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use thiserror::Error;

/// Errors from building a client out of the environment.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("env var {0} not set")]
    MissingVar(&'static str),
}

/// Classify a non-success response by status.
pub(crate) fn map_http_status(status: StatusCode, headers: &HeaderMap, body: &str) -> TransportError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TransportError::Authentication(message),
        StatusCode::BAD_REQUEST => TransportError::InvalidRequest(message),
        StatusCode::NOT_FOUND => TransportError::ModelNotFound(message),
        StatusCode::TOO_MANY_REQUESTS => TransportError::RateLimit {
            retry_after: retry_after(headers),
        },
        s if s.is_server_error() => TransportError::ServiceUnavailable(message),
        s => TransportError::InvalidRequest(format!("HTTP {s}: {message}")),
    }
}

/// `error.message` from a GLM error body, tagged with `error.code` when present.
/// Anything else is passed through as text.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let error = &json["error"];
    let Some(message) = error["message"].as_str() else {
        return body.trim().to_string();
    };
    match error["code"].as_str() {
        Some(code) => format!("{message} (code {code})"),
        None => message.to_string(),
    }
}

/// `Retry-After` in delay-seconds form. HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Classify a `reqwest` failure while sending or reading.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_body() || err.is_decode() {
        TransportError::Read(err.to_string())
    } else {
        TransportError::Network(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    const GLM_AUTH_BODY: &str = r#"{"error":{"code":"1000","message":"Authentication failed"}}"#;

    #[test]
    fn auth_statuses_carry_glm_message() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = map_http_status(status, &HeaderMap::new(), GLM_AUTH_BODY);
            assert!(
                matches!(err, TransportError::Authentication(ref msg) if msg == "Authentication failed (code 1000)"),
                "{err:?}"
            );
        }
    }

    #[test]
    fn plain_text_body_is_kept() {
        let err = map_http_status(StatusCode::BAD_REQUEST, &HeaderMap::new(), "bad body\n");
        assert!(matches!(err, TransportError::InvalidRequest(msg) if msg == "bad body"));
    }

    #[test]
    fn message_without_code() {
        let err = map_http_status(
            StatusCode::NOT_FOUND,
            &HeaderMap::new(),
            r#"{"error":{"message":"model glm-x does not exist"}}"#,
        );
        assert!(matches!(err, TransportError::ModelNotFound(msg) if msg == "model glm-x does not exist"));
    }

    #[test]
    fn json_without_error_message_is_passed_through() {
        let err = map_http_status(StatusCode::BAD_GATEWAY, &HeaderMap::new(), r#"{"status":502}"#);
        assert!(matches!(err, TransportError::ServiceUnavailable(msg) if msg == r#"{"status":502}"#));
    }

    #[test]
    fn rate_limit_reads_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("60"));
        let err = map_http_status(StatusCode::TOO_MANY_REQUESTS, &headers, "{}");
        assert!(matches!(
            err,
            TransportError::RateLimit { retry_after: Some(d) } if d == Duration::from_secs(60)
        ));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"));
        let err = map_http_status(StatusCode::TOO_MANY_REQUESTS, &headers, "{}");
        assert!(matches!(err, TransportError::RateLimit { retry_after: None }));
    }

    #[test]
    fn server_errors_are_unavailable() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = map_http_status(status, &HeaderMap::new(), "down");
            assert!(matches!(err, TransportError::ServiceUnavailable(_)));
        }
    }

    #[test]
    fn unknown_status_keeps_code() {
        let err = map_http_status(StatusCode::IM_A_TEAPOT, &HeaderMap::new(), "teapot");
        assert!(matches!(err, TransportError::InvalidRequest(msg) if msg.contains("418")));
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::MissingVar("GLM_API_KEY").to_string(),
            "env var GLM_API_KEY not set"
        );
    }
}
