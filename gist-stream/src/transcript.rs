//! Accumulating tokens into displayable text.

use futures::StreamExt;

use crate::fallback::{Token, TokenHandle};

/// Shown when a stream finished successfully but produced no text.
pub const NO_SUMMARY_TEXT: &str = "No summary available.";

/// How a finished stream should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The generated text.
    Summary(String),
    /// The stream ended normally with no text.
    NoSummary,
    /// The stream failed; holds the diagnostic text.
    Failed(String),
}

impl Outcome {
    /// The text to put on screen.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            Outcome::Summary(text) | Outcome::Failed(text) => text,
            Outcome::NoSummary => NO_SUMMARY_TEXT,
        }
    }
}

/// Growing display buffer fed one token at a time.
#[derive(Debug, Default)]
pub struct Transcript {
    text: String,
    failure: Option<String>,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token in arrival order.
    pub fn push(&mut self, token: &Token) {
        match token {
            Token::Content(text) => self.text.push_str(text),
            Token::Diagnostic(text) => self.failure = Some(text.clone()),
        }
    }

    /// Text accumulated so far, for progressive rendering.
    #[must_use]
    pub fn text(&self) -> &str {
        match &self.failure {
            Some(diagnostic) => diagnostic,
            None => &self.text,
        }
    }

    /// Settle the final outcome. Whitespace-only text counts as empty.
    #[must_use]
    pub fn finish(self) -> Outcome {
        if let Some(diagnostic) = self.failure {
            return Outcome::Failed(diagnostic);
        }
        if self.text.trim().is_empty() {
            return Outcome::NoSummary;
        }
        Outcome::Summary(self.text)
    }

    /// Drain a handle to completion.
    pub async fn collect(mut handle: TokenHandle) -> Outcome {
        let mut transcript = Self::new();
        while let Some(token) = handle.receiver.next().await {
            transcript.push(&token);
        }
        transcript.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_in_order() {
        let mut t = Transcript::new();
        t.push(&Token::Content("Hel".into()));
        assert_eq!(t.text(), "Hel");
        t.push(&Token::Content("lo".into()));
        assert_eq!(t.finish(), Outcome::Summary("Hello".into()));
    }

    #[test]
    fn empty_is_no_summary() {
        let outcome = Transcript::new().finish();
        assert_eq!(outcome, Outcome::NoSummary);
        assert_eq!(outcome.display_text(), NO_SUMMARY_TEXT);
    }

    #[test]
    fn whitespace_only_is_no_summary() {
        let mut t = Transcript::new();
        t.push(&Token::Content(" \n".into()));
        assert_eq!(t.finish(), Outcome::NoSummary);
    }

    #[test]
    fn diagnostic_replaces_partial_text() {
        let mut t = Transcript::new();
        t.push(&Token::Content("partial".into()));
        t.push(&Token::Diagnostic("Summary generation failed: boom".into()));
        assert_eq!(t.text(), "Summary generation failed: boom");
        let outcome = t.finish();
        assert_eq!(
            outcome,
            Outcome::Failed("Summary generation failed: boom".into())
        );
        assert_ne!(outcome.display_text(), NO_SUMMARY_TEXT);
    }
}
