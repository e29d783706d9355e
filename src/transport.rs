//! Transport contract between the session driver and a backend.
//!
//! This module only defines the seam. HTTP lives in `nexus_api`; scripted
//! replay lives in the client crate.

use std::fmt;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

/// Single-pass stream of raw response chunks.
pub type ChunkStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

/// Connection or stream failure. Always fatal to the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<String> for TransportError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for TransportError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Opens one response stream per user turn.
pub trait ChatTransport: Send + Sync {
    /// Stable identifier shown in diagnostics.
    fn name(&self) -> &str;

    /// Sends `prompt` and resolves once response headers arrive.
    fn open<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<ChunkStream, TransportError>>;
}
