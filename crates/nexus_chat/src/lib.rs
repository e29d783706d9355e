//! Terminal chat client for the Nexus backend.
//!
//! ## Provider bootstrap
//!
//! - `NEXUS_PROVIDER=http` (default) streams from a running backend
//! - `NEXUS_PROVIDER=mock` replays canned responses for local demos and tests
//!
//! For `http`, `NEXUS_BASE_URL` overrides the service root
//! (default `http://localhost:8000`). `NEXUS_CONFIG_PATH` may point to a
//! UTF-8 JSON file with this shape:
//!
//! ```json
//! {
//!   "base_url": "http://localhost:8000",
//!   "timeout_sec": 120,
//!   "user_agent": "nexus-chat"
//! }
//! ```
//!
//! Contract notes:
//! - Every field is optional; `NEXUS_BASE_URL` wins over `base_url`.
//! - `timeout_sec` must be > 0 when provided.
//! - Unknown JSON fields are rejected.
//!
//! ## Logging
//!
//! `NEXUS_LOG` sets the `tracing` filter and `NEXUS_LOG_FILE` redirects logs
//! away from stderr; see [`nexus_ui::logging`].

pub mod app;
pub mod commands;
pub mod config;
pub mod providers;
pub mod render;
