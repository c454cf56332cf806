//! Reassembly of decoded text into complete lines.

use crate::envelope::is_sentinel;

/// Accumulates text and hands out only complete lines.
///
/// Between calls the buffer never holds a `\n`; it keeps only the trailing
/// partial line, which may be empty.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and return every line it completed, in order.
    ///
    /// A trailing `\r` is removed from each line.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.pending.push_str(text);

        let Some(last_newline) = self.pending.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..last_newline]
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect()
    }

    /// Take the unterminated remainder at end of stream.
    ///
    /// Returns `None` when it is blank or is the sentinel.
    pub fn flush(&mut self) -> Option<String> {
        let remaining = std::mem::take(&mut self.pending);
        let trimmed = remaining.trim();
        if trimmed.is_empty() || is_sentinel(trimmed) {
            return None;
        }
        Some(remaining.trim_end_matches('\r').to_string())
    }

    /// The partial line currently held back.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }
}
