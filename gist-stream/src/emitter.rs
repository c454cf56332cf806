//! The pull-based token stream.
//!
//! [`TokenStream`] drives the decoder, the line buffer and the envelope parser
//! across incoming chunks. Nothing is read from the transport until the
//! consumer polls, and at most one chunk's worth of tokens is held ahead of
//! the consumer.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::Stream;

use crate::decode::Utf8Decoder;
use crate::envelope::{Record, is_sentinel, parse_record};
use crate::error::TransportError;
use crate::lines::LineBuffer;

/// A boxed transport body: ordered byte chunks, or the error that ended them.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Why the stream stopped (or that it has not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationState {
    /// More chunks expected.
    Open,
    /// `[DONE]` was seen; later records are ignored.
    SentinelSeen,
    /// The transport ran out of chunks.
    StreamEnded,
    /// The transport failed.
    Failed(String),
}

/// Where the emitter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not polled yet.
    Idle,
    /// Reading chunks from the transport.
    Streaming,
    /// Transport exhausted; flushing buffered text.
    Draining,
    /// Exhausted. Further polls return `None`.
    Done,
    /// A transport error was handed out. Further polls return `None`.
    Failed,
}

/// Counters for one stream, logged when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Byte chunks received from the transport.
    pub chunks: usize,
    /// Complete lines handed to the parser.
    pub lines: usize,
    /// Content tokens produced.
    pub tokens: usize,
    /// Records skipped as unusable.
    pub skipped: usize,
    /// Last `finish_reason` reported by the endpoint.
    pub finish_reason: Option<String>,
}

/// Lazy stream of content tokens decoded from a chunked event stream.
///
/// Yields `Ok(token)` for each non-empty content fragment in stream order. A
/// transport failure is yielded once as `Err`, after which the stream ends.
/// Dropping the stream drops the transport.
pub struct TokenStream {
    source: Option<ByteStream>,
    phase: Phase,
    termination: TerminationState,
    decoder: Utf8Decoder,
    lines: LineBuffer,
    ready: VecDeque<String>,
    stats: StreamStats,
}

impl TokenStream {
    /// Wrap a transport body.
    pub fn new<S>(source: S) -> Self
    where
        S: Stream<Item = Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            source: Some(Box::pin(source)),
            phase: Phase::Idle,
            termination: TerminationState::Open,
            decoder: Utf8Decoder::new(),
            lines: LineBuffer::new(),
            ready: VecDeque::new(),
            stats: StreamStats::default(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current termination state.
    #[must_use]
    pub fn termination(&self) -> &TerminationState {
        &self.termination
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    fn ingest(&mut self, chunk: &[u8]) {
        self.stats.chunks += 1;
        let text = self.decoder.decode(chunk);
        for line in self.lines.push(&text) {
            self.handle_line(&line);
            if self.termination == TerminationState::SentinelSeen {
                break;
            }
        }
    }

    fn drain(&mut self) {
        let tail = self.decoder.finish();
        for line in self.lines.push(&tail) {
            self.handle_line(&line);
            if self.termination == TerminationState::SentinelSeen {
                return;
            }
        }
        if is_sentinel(self.lines.pending()) {
            // `flush` discards it, but it still ends the stream cleanly.
            tracing::debug!("unterminated sentinel at end of stream");
            self.termination = TerminationState::SentinelSeen;
        }
        if let Some(line) = self.lines.flush() {
            self.handle_line(&line);
        }
    }

    fn handle_line(&mut self, line: &str) {
        self.stats.lines += 1;
        match parse_record(line) {
            Record::Blank => {}
            Record::Done => {
                tracing::debug!("sentinel received; ignoring the rest of the stream");
                self.termination = TerminationState::SentinelSeen;
            }
            Record::Skipped => self.stats.skipped += 1,
            Record::Delta {
                content,
                finish_reason,
            } => {
                if finish_reason.is_some() {
                    self.stats.finish_reason = finish_reason;
                }
                if let Some(token) = content {
                    self.stats.tokens += 1;
                    self.ready.push_back(token);
                }
            }
        }
    }

    fn finish(&mut self, phase: Phase) {
        // Releases the transport; `source` is never refilled.
        self.source = None;
        self.phase = phase;
        tracing::debug!(
            termination = ?self.termination,
            chunks = self.stats.chunks,
            lines = self.stats.lines,
            tokens = self.stats.tokens,
            skipped = self.stats.skipped,
            finish_reason = ?self.stats.finish_reason,
            "token stream finished"
        );
    }
}

impl Stream for TokenStream {
    type Item = Result<String, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if let Some(token) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(token)));
            }

            match this.phase {
                Phase::Idle => this.phase = Phase::Streaming,
                Phase::Streaming => {
                    if this.termination == TerminationState::SentinelSeen {
                        this.finish(Phase::Done);
                        continue;
                    }
                    let Some(source) = this.source.as_mut() else {
                        this.phase = Phase::Draining;
                        continue;
                    };
                    match ready!(source.as_mut().poll_next(cx)) {
                        Some(Ok(chunk)) => this.ingest(&chunk),
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "transport failed mid-stream");
                            this.termination = TerminationState::Failed(e.to_string());
                            this.finish(Phase::Failed);
                            return Poll::Ready(Some(Err(e)));
                        }
                        None => {
                            this.termination = TerminationState::StreamEnded;
                            this.phase = Phase::Draining;
                        }
                    }
                }
                Phase::Draining => {
                    this.drain();
                    this.finish(Phase::Done);
                }
                Phase::Done | Phase::Failed => return Poll::Ready(None),
            }
        }
    }
}

impl Drop for TokenStream {
    fn drop(&mut self) {
        if self.source.is_some() {
            tracing::debug!(phase = ?self.phase, "token stream dropped before completion");
        }
    }
}
