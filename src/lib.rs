//! Streaming core for the Nexus generative-UI chat client.
//!
//! Invariant: a single [`Session`] owns the transcript and the canvas; every byte of a
//! response passes through [`Session::ingest_chunk`] in arrival order.
//!
//! # Public API Overview
//! - Split a chunked NDJSON body into typed records with [`RecordDecoder`].
//! - Separate prose from an embedded component payload with [`marker::scan`].
//! - Decode that payload into a typed [`Artifact`].
//! - Drive a full request/response cycle with [`run_cycle`] over any [`ChatTransport`].
//!
//! Rendering is left to the host; [`SessionObserver`] receives a consistent snapshot
//! after each chunk.

#![allow(clippy::derivable_impls)]

pub mod config;
pub mod logging;

pub mod artifact;
pub mod canvas;
pub mod controller;
pub mod marker;
pub mod record;
pub mod session;
pub mod transcript;
pub mod transport;

/// Typed component payloads.
pub use crate::artifact::{
    Artifact, ArtifactError, BarChartArtifact, BarPoint, CellValue, TableArtifact,
};
/// Single-artifact holder.
pub use crate::canvas::Canvas;
/// Environment configuration.
pub use crate::config::EnvConfig;
/// Cycle driver and observer seam.
pub use crate::controller::{run_cycle, CycleOutcome, SessionObserver};
/// Marker scanning.
pub use crate::marker::{ArtifactScan, ScanOutcome, CLOSE_MARKER, OPEN_MARKER};
/// NDJSON record decoding.
pub use crate::record::{RecordDecoder, RecordError, StreamRecord};
/// Session state machine.
pub use crate::session::{Diagnostic, Phase, Session, SessionConfig};
/// Conversation history.
pub use crate::transcript::{ChatTurn, Role, Transcript};
/// Transport contract.
pub use crate::transport::{ChatTransport, ChunkStream, TransportError};
