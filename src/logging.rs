//! Diagnostic logging sinks.
//!
//! Logs go to stderr by default so they never interleave with the transcript
//! on stdout. Set `NEXUS_LOG_FILE` to append them to a file instead.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EnvConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter `{filter}`: {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("cannot open log file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Installs the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, so calling
/// this more than once (tests, embedding hosts) is harmless.
pub fn init(config: &EnvConfig) -> Result<bool, LoggingError> {
    let filter_text = config.effective_log_filter();
    let filter = EnvFilter::try_new(filter_text).map_err(|source| LoggingError::Filter {
        filter: filter_text.to_string(),
        source,
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match &config.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
                .is_ok()
        }
        None => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .try_init()
            .is_ok(),
    };

    Ok(installed)
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    let path = PathBuf::from(path);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LoggingError::File {
            path: path.clone(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::File { path, source })
}
