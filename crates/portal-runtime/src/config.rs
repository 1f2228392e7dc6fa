#![forbid(unsafe_code)]

//! Environment-driven configuration.
//!
//! # Environment Variables
//!
//! - `PORTAL_RELAY_URL` - Mail relay endpoint (default [`DEFAULT_RELAY_URL`])
//! - `PORTAL_RELAY_TIMEOUT_SECS` - Whole-request timeout; unset means none
//! - `PORTAL_STATE_PATH` - Key-value store file (default
//!   `$XDG_STATE_HOME/portal/state.json`, then
//!   `$HOME/.local/state/portal/state.json`, then `./portal-state.json`)
//! - `PORTAL_DEFAULT_LOCALE` - Locale used before one is persisted (`ru`)
//! - `PORTAL_STRINGS_DIR` - Directory with `ru.json` / `uz.json` string
//!   overrides; unset means built-in strings only
//! - `PORTAL_LOG` - `tracing` filter directives (default `info`)
//! - `PORTAL_LOG_JSON` - `true` for JSON log lines
//!
//! Empty values count as unset.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use portal_i18n::Locale;

/// Mail relay endpoint used when none is configured.
pub const DEFAULT_RELAY_URL: &str = "https://nodemailer-ser.herokuapp.com/api/email";

/// Default `tracing` filter.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The relay URL is not an http(s) URL.
    InvalidRelayUrl(String),
    /// The timeout is not a positive whole number of seconds.
    InvalidTimeout(String),
    /// The locale code is not supported.
    UnsupportedLocale(String),
    /// A boolean variable holds something other than true/false/1/0.
    InvalidBool { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRelayUrl(url) => write!(f, "relay URL must start with http:// or https://: {url}"),
            Self::InvalidTimeout(raw) => write!(f, "invalid relay timeout (seconds): {raw}"),
            Self::UnsupportedLocale(raw) => write!(f, "unsupported locale: {raw}"),
            Self::InvalidBool { var, value } => write!(f, "{var} must be true or false, got {value}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives.
    pub filter: String,
    /// Emit JSON instead of human-readable lines.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub relay_url: String,
    pub relay_timeout: Option<Duration>,
    pub state_path: PathBuf,
    pub default_locale: Locale,
    pub strings_dir: Option<PathBuf>,
    pub log: LogConfig,
}

impl PortalConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through `lookup` (variable name → value).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let relay_url = match get("PORTAL_RELAY_URL") {
            Some(url) => {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidRelayUrl(url));
                }
                url
            }
            None => DEFAULT_RELAY_URL.to_string(),
        };

        let relay_timeout = match get("PORTAL_RELAY_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => None,
        };

        let state_path = get("PORTAL_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_state_path(&get));

        let default_locale = match get("PORTAL_DEFAULT_LOCALE") {
            Some(raw) => Locale::parse(&raw).ok_or(ConfigError::UnsupportedLocale(raw))?,
            None => Locale::DEFAULT,
        };

        let strings_dir = get("PORTAL_STRINGS_DIR").map(PathBuf::from);

        let log = LogConfig {
            filter: get("PORTAL_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            json: match get("PORTAL_LOG_JSON") {
                Some(raw) => parse_bool("PORTAL_LOG_JSON", &raw)?,
                None => false,
            },
        };

        Ok(Self {
            relay_url,
            relay_timeout,
            state_path,
            default_locale,
            strings_dir,
            log,
        })
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            relay_timeout: None,
            state_path: PathBuf::from("portal-state.json"),
            default_locale: Locale::DEFAULT,
            strings_dir: None,
            log: LogConfig::default(),
        }
    }
}

fn default_state_path(get: &dyn Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(state_home) = get("XDG_STATE_HOME") {
        return PathBuf::from(state_home).join("portal").join("state.json");
    }
    if let Some(home) = get("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("portal")
            .join("state.json");
    }
    PathBuf::from("portal-state.json")
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: raw.to_string(),
        }),
    }
}
