#![doc = include_str!("../README.md")]

pub mod decode;
pub mod emitter;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod lines;
pub mod transcript;

pub use emitter::{ByteStream, Phase, StreamStats, TerminationState, TokenStream};
pub use error::{RecordError, TransportError};
pub use fallback::{Token, TokenHandle, with_fallback};
pub use transcript::{NO_SUMMARY_TEXT, Outcome, Transcript};
