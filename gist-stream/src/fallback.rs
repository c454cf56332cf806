//! Consumer-facing token items and the failure fallback.

use std::fmt;
use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::emitter::TokenStream;
use crate::error::TransportError;

/// One item handed to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A fragment of generated text.
    Content(String),
    /// Human-readable description of a transport failure. Always the last item.
    Diagnostic(String),
}

impl Token {
    /// The text of this token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Token::Content(s) | Token::Diagnostic(s) => s,
        }
    }

    /// Whether this is the failure diagnostic.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Token::Diagnostic(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a summary being streamed.
pub struct TokenHandle {
    /// The stream of tokens. Consume with `StreamExt::next()`; drop to cancel.
    pub receiver: Pin<Box<dyn Stream<Item = Token> + Send>>,
}

/// Text of the diagnostic token for a transport failure.
#[must_use]
pub fn diagnostic(err: &TransportError) -> String {
    format!("Summary generation failed: {err}")
}

/// Wrap an opened (or failed-to-open) token stream so that it never errors.
///
/// Content tokens pass through in order. A failure, whether opening the
/// stream or reading it, becomes exactly one [`Token::Diagnostic`] followed by
/// the end of the stream.
pub fn with_fallback(opened: Result<TokenStream, TransportError>) -> TokenHandle {
    let tokens = async_stream::stream! {
        let mut tokens = match opened {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "could not open token stream");
                yield Token::Diagnostic(diagnostic(&e));
                return;
            }
        };

        while let Some(item) = tokens.next().await {
            match item {
                Ok(text) => yield Token::Content(text),
                Err(e) => {
                    yield Token::Diagnostic(diagnostic(&e));
                    return;
                }
            }
        }
    };

    TokenHandle {
        receiver: Box::pin(tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;

    async fn collect(mut handle: TokenHandle) -> Vec<Token> {
        let mut out = Vec::new();
        while let Some(token) = handle.receiver.next().await {
            out.push(token);
        }
        out
    }

    #[tokio::test]
    async fn open_failure_yields_single_diagnostic() {
        let handle = with_fallback(Err(TransportError::Authentication("bad key".into())));
        let out = collect(handle).await;
        assert_eq!(
            out,
            vec![Token::Diagnostic(
                "Summary generation failed: authentication failed: bad key".into()
            )]
        );
    }

    #[tokio::test]
    async fn content_passes_through() {
        let items: Vec<Result<Bytes, TransportError>> = vec![Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\ndata: [DONE]\n",
        ))];
        let out = collect(with_fallback(Ok(TokenStream::new(stream::iter(items))))).await;
        assert_eq!(out, vec![Token::Content("hi".into())]);
    }

    #[test]
    fn display_and_accessors() {
        let token = Token::Content("abc".into());
        assert_eq!(token.to_string(), "abc");
        assert!(!token.is_diagnostic());
        assert!(Token::Diagnostic("x".into()).is_diagnostic());
    }
}
