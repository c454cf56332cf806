//! Error types for the token stream.

use std::time::Duration;

use thiserror::Error;

/// Failure of the transport that feeds the token stream.
///
/// This is the only error that reaches a consumer, and it does so as data:
/// the fallback wrapper turns it into a single [`Token::Diagnostic`].
///
/// [`Token::Diagnostic`]: crate::Token::Diagnostic
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (connection reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Rate limited by the endpoint.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimit {
        /// Suggested retry delay, if the endpoint provided one.
        retry_after: Option<Duration>,
    },
    /// Endpoint is temporarily unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Authentication/authorization failure.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// Malformed or rejected request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Requested model does not exist.
    #[error("model not found: {0}")]
    ModelNotFound(String),
    /// Reading the response body failed mid-stream.
    #[error("stream read error: {0}")]
    Read(String),
}

/// Why a single record produced no token.
///
/// Recovered locally by the envelope parser and only ever logged.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RecordError {
    /// The payload is not valid JSON.
    #[error("JSON parse error in record: {0}")]
    Json(#[from] serde_json::Error),
    /// The endpoint sent an error envelope instead of a delta.
    #[error("upstream error in record: {0}")]
    Upstream(String),
}
