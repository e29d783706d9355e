//! Environment configuration.

use std::env;

pub const LOG_FILTER_ENV_VAR: &str = "NEXUS_LOG";
pub const LOG_FILE_ENV_VAR: &str = "NEXUS_LOG_FILE";
pub const DEBUG_ENV_VAR: &str = "NEXUS_DEBUG";

/// Filter used when neither `NEXUS_LOG` nor `NEXUS_DEBUG` is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// `tracing-subscriber` filter directive, e.g. `nexus_ui=debug`.
    pub log_filter: Option<String>,
    /// Log destination; stderr when unset.
    pub log_file: Option<String>,
    pub debug: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: env_string_opt(LOG_FILTER_ENV_VAR),
            log_file: env_string_opt(LOG_FILE_ENV_VAR),
            debug: env_flag(DEBUG_ENV_VAR),
        }
    }

    /// Explicit filter first, then the debug flag, then the default.
    pub fn effective_log_filter(&self) -> &str {
        match (&self.log_filter, self.debug) {
            (Some(filter), _) => filter,
            (None, true) => "debug",
            (None, false) => DEFAULT_LOG_FILTER,
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        }
    })
}
