#![forbid(unsafe_code)]

//! `tracing` subscriber setup.
//!
//! Libraries in this workspace only emit events. A binary or test harness
//! calls [`init_tracing`] once; if a global subscriber is already installed
//! it is left alone.

use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Errors that can occur during subscriber setup.
#[derive(Debug)]
pub enum LogInitError {
    /// The filter directives could not be parsed.
    InvalidFilter(String),
}

impl fmt::Display for LogInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFilter(msg) => write!(f, "invalid log filter: {msg}"),
        }
    }
}

impl std::error::Error for LogInitError {}

/// Install a global fmt subscriber.
///
/// Returns `Ok(false)` when another subscriber was already set.
pub fn init_tracing(config: &LogConfig) -> Result<bool, LogInitError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| LogInitError::InvalidFilter(e.to_string()))?;

    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "tracing installed");
    }
    Ok(installed)
}
