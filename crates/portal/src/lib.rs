#![forbid(unsafe_code)]

//! Submission portal public facade.
//!
//! Re-exports the types a shell needs from the internal crates and wires a
//! ready-to-run [`Program`] from a [`PortalConfig`].
//!
//! # Example
//!
//! ```no_run
//! use portal::prelude::*;
//!
//! let config = PortalConfig::from_env()?;
//! let mut program = portal::bootstrap(&config)?;
//! program.dispatch(Msg::FieldEdited(FieldKey::Fio, FieldValue::text("A B")))?;
//! # Ok::<(), portal::Error>(())
//! ```

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

// --- Core re-exports -------------------------------------------------------

pub use portal_core::{
    AcceptedTypes, CatalogError, FieldCatalog, FieldDescriptor, FieldKey, FieldValue, FileBlob,
    InputKind, SelectOption,
};

// --- i18n re-exports -------------------------------------------------------

pub use portal_i18n::{CatalogLoadError, CatalogTranslator, Locale, StringCatalog, Translate};

// --- Runtime re-exports ----------------------------------------------------

pub use portal_runtime::{
    Cmd, ConfigError, Feedback, FileStore, Form, KeyValueStore, LogConfig, LogInitError,
    MailRelay, MemoryStore, Model, Msg, Notification, NotificationKind, PipelineState,
    PortalApp, PortalConfig, PortalDeps, Program, RelayOutcome, Simulator, StorageError,
};

#[cfg(feature = "http")]
pub use portal_relay::{HttpRelay, RelayError};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for portal shells.
#[derive(Debug)]
pub enum Error {
    /// I/O failure while starting the runtime.
    Io(std::io::Error),
    /// Invalid configuration.
    Config(ConfigError),
    /// Logging could not be set up.
    Log(LogInitError),
    /// String table overrides could not be loaded.
    Strings(CatalogLoadError),
    /// The HTTP relay client could not be built.
    #[cfg(feature = "http")]
    Relay(RelayError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Log(err) => write!(f, "{err}"),
            Self::Strings(err) => write!(f, "{err}"),
            #[cfg(feature = "http")]
            Self::Relay(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Log(err) => Some(err),
            Self::Strings(err) => Some(err),
            #[cfg(feature = "http")]
            Self::Relay(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LogInitError> for Error {
    fn from(err: LogInitError) -> Self {
        Self::Log(err)
    }
}

impl From<CatalogLoadError> for Error {
    fn from(err: CatalogLoadError) -> Self {
        Self::Strings(err)
    }
}

#[cfg(feature = "http")]
impl From<RelayError> for Error {
    fn from(err: RelayError) -> Self {
        Self::Relay(err)
    }
}

/// Standard result type for portal APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bootstrap ------------------------------------------------------------

/// Built-in strings overlaid with the files in `config.strings_dir`, if set.
pub fn strings_for(config: &PortalConfig) -> Result<StringCatalog> {
    let mut strings = StringCatalog::builtin();
    if let Some(dir) = &config.strings_dir {
        let applied = strings.extend_from_dir(dir)?;
        tracing::info!(dir = %dir.display(), applied, "string overrides loaded");
    }
    Ok(strings)
}

/// Assemble the application dependencies for `config` around `relay`.
///
/// State lives in a [`FileStore`] at `config.state_path`; strings come from
/// [`strings_for`].
pub fn deps_for(config: &PortalConfig, relay: Arc<dyn MailRelay>) -> Result<PortalDeps> {
    let strings = strings_for(config)?;
    Ok(PortalDeps {
        catalog: Arc::new(FieldCatalog::standard()),
        store: Arc::new(FileStore::new(&config.state_path)),
        relay,
        translator: Rc::new(CatalogTranslator::new(Arc::new(strings), config.default_locale)),
        fallback_locale: config.default_locale,
    })
}

/// Start a program for `config` with a caller-provided relay.
pub fn bootstrap_with_relay(
    config: &PortalConfig,
    relay: Arc<dyn MailRelay>,
) -> Result<Program<PortalApp>> {
    let app = PortalApp::new(deps_for(config, relay)?);
    let program = Program::new(app)?;
    tracing::debug!(state = %config.state_path.display(), "program running");
    Ok(program)
}

/// Start a program for `config` posting to the configured HTTP relay.
#[cfg(feature = "http")]
pub fn bootstrap(config: &PortalConfig) -> Result<Program<PortalApp>> {
    let relay = HttpRelay::new(config.relay_url.clone(), config.relay_timeout)?;
    tracing::debug!(endpoint = relay.endpoint(), "relay configured");
    bootstrap_with_relay(config, Arc::new(relay))
}

/// Read configuration from the environment, install logging and start.
#[cfg(feature = "http")]
pub fn bootstrap_from_env() -> Result<Program<PortalApp>> {
    let config = PortalConfig::from_env()?;
    portal_runtime::init_tracing(&config.log)?;
    bootstrap(&config)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Cmd, Error, FieldCatalog, FieldKey, FieldValue, FileBlob, Form, Locale, MailRelay, Model,
        Msg, NotificationKind, PortalApp, PortalConfig, Program, RelayOutcome, Result, Translate,
    };

    pub use crate::{core, i18n, runtime};

    #[cfg(feature = "http")]
    pub use crate::{HttpRelay, relay};
}

pub use portal_core as core;
pub use portal_i18n as i18n;
#[cfg(feature = "http")]
pub use portal_relay as relay;
pub use portal_runtime as runtime;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts() {
        let err: Error = ConfigError::InvalidTimeout("x".into()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_error_displays_inner() {
        let err: Error = std::io::Error::other("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
