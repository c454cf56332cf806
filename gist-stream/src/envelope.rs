//! Per-line parsing of the chat-completions event stream.
//!
//! Each record is one line:
//! ```text
//! data: {"id":"...","choices":[{"index":0,"delta":{"content":"text"}}]}
//!
//! data: [DONE]
//! ```
//!
//! The parser never fails. A line it cannot use is logged and skipped.

use serde_json::Value;

use crate::error::RecordError;

/// Prefix in front of every record payload. Its absence is tolerated.
pub const DATA_PREFIX: &str = "data: ";

/// Marker for the end of meaningful content.
pub const DONE_SENTINEL: &str = "[DONE]";

/// What a single line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Empty or whitespace-only line.
    Blank,
    /// The `[DONE]` sentinel.
    Done,
    /// A payload that could not be used (malformed JSON, error envelope).
    Skipped,
    /// A decoded envelope.
    Delta {
        /// `choices[0].delta.content`, when present and non-empty.
        content: Option<String>,
        /// `choices[0].finish_reason`, when present.
        finish_reason: Option<String>,
    },
}

impl Record {
    /// The content token this record carries, if any.
    #[must_use]
    pub fn into_token(self) -> Option<String> {
        match self {
            Record::Delta { content, .. } => content,
            _ => None,
        }
    }
}

/// Whether a line is the sentinel record.
#[must_use]
pub fn is_sentinel(line: &str) -> bool {
    line.trim().contains(DONE_SENTINEL)
}

/// Classify one line and extract its content token.
pub fn parse_record(line: &str) -> Record {
    let line = line.trim();
    if line.is_empty() {
        return Record::Blank;
    }
    if is_sentinel(line) {
        return Record::Done;
    }

    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
    match decode_envelope(payload) {
        Ok(record) => record,
        Err(RecordError::Upstream(message)) => {
            tracing::warn!(%message, "skipping error envelope in stream");
            Record::Skipped
        }
        Err(e) => {
            tracing::debug!(error = %e, line = %line, "skipping unparseable record");
            Record::Skipped
        }
    }
}

fn decode_envelope(payload: &str) -> Result<Record, RecordError> {
    let json: Value = serde_json::from_str(payload)?;

    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        let message = error["message"]
            .as_str()
            .unwrap_or("unknown streaming error")
            .to_string();
        return Err(RecordError::Upstream(message));
    }

    let choice = &json["choices"][0];
    let content = choice["delta"]["content"]
        .as_str()
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let finish_reason = choice["finish_reason"].as_str().map(str::to_string);

    Ok(Record::Delta {
        content,
        finish_reason,
    })
}
