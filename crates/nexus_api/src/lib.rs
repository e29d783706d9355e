//! HTTP transport for the Nexus chat backend.
//!
//! This crate owns request building, URL normalization, header construction
//! and error decoding for the `/chat` streaming endpoint and the `/health`
//! probe. It knows nothing about transcripts or artifacts: the chat body is
//! handed back as raw byte chunks for the caller to decode.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::{ByteStream, NexusApiClient};
pub use config::NexusApiConfig;
pub use error::NexusApiError;
pub use payload::{ChatRequest, HealthStatus};
pub use url::{normalize_chat_url, normalize_health_url, DEFAULT_NEXUS_BASE_URL};
