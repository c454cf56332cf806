#![doc = include_str!("../README.md")]

pub mod client;
pub mod error;
pub(crate) mod mapping;

pub use client::Glm;
pub use error::ConfigError;

// Re-export gist-stream for convenience
pub use gist_stream::{Outcome, Token, TokenHandle, TokenStream, Transcript, TransportError};
