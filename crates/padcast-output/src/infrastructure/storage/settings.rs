//! TOML settings file and its merge with command-line overrides.
//!
//! The settings file is optional.  A typical one looks like:
//!
//! ```toml
//! host = "pads.local"
//! port = 8000
//! ip_version = "auto"     # 4, 6, "auto" (also "v4", "ipv6", …)
//! secure = false
//! group = "living-room"
//! name = "Couch PC"
//! log_level = "info"
//!
//! [keybind_presets.arrows]
//! ArrowUp = "BTN_DPAD_UP"
//! ArrowDown = "BTN_DPAD_DOWN"
//! ```
//!
//! # Precedence
//!
//! For every setting: command line (or its `PADCAST_*` environment variable)
//! → settings file → built-in default.  The merged result is validated once,
//! by [`SettingsFile::into_config`].
//!
//! # Missing files
//!
//! When no `--settings` path is given, the default `settings.toml` is read if
//! it exists and silently skipped if it does not.  A path given explicitly
//! must exist.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use padcast_core::{IpPreference, KeybindPresets};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::config::{
    ConfigError, OutputConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_RETRY_DELAY,
};

/// Settings file read when `--settings` is not given.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.toml";

/// Error type for loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An explicitly named settings file does not exist.
    #[error("settings file {0} not found")]
    NotFound(PathBuf),

    /// A file system I/O error occurred.
    #[error("I/O error reading settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The merged settings do not form a usable configuration.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// `ip_version` may be written as a number (`4`) or a string (`"auto"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IpVersionSetting {
    Number(i64),
    Text(String),
}

impl fmt::Display for IpVersionSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Contents of the settings file.  Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ip_version: Option<IpVersionSetting>,
    pub secure: Option<bool>,
    pub tls_verify: Option<bool>,
    pub group: Option<String>,
    pub name: Option<String>,
    /// `tracing` level or filter directive: `"error"`, `"warn"`, `"info"`, …
    pub log_level: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub retry_delay_secs: Option<u64>,
    #[serde(default)]
    pub keybind_presets: KeybindPresets,
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ip_version: Option<String>,
    pub secure: Option<bool>,
    pub tls_verify: Option<bool>,
    pub group: Option<String>,
    pub name: Option<String>,
}

/// Loads the settings file at `path`.
///
/// `explicit` is `true` when the user named the file; only then is a missing
/// file an error.
///
/// # Errors
///
/// Returns [`SettingsError::NotFound`] for a missing explicit file,
/// [`SettingsError::Io`] for other file-system errors and
/// [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path, explicit: bool) -> Result<SettingsFile, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if explicit {
                Err(SettingsError::NotFound(path.to_path_buf()))
            } else {
                debug!("no settings file at {}; using defaults", path.display());
                Ok(SettingsFile::default())
            }
        }
        Err(source) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl SettingsFile {
    /// Merges `overrides` over the file contents and validates the result.
    ///
    /// The group id and device name are trimmed; an empty device name counts
    /// as absent.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] if the group is missing, the IP
    /// version is not recognised or a timeout is zero.
    pub fn into_config(self, overrides: CliOverrides) -> Result<OutputConfig, SettingsError> {
        let ip_version = match overrides
            .ip_version
            .or_else(|| self.ip_version.map(|v| v.to_string()))
        {
            Some(text) => text
                .parse::<IpPreference>()
                .map_err(|_| ConfigError::InvalidIpVersion(text))?,
            None => IpPreference::Auto,
        };

        let config = OutputConfig {
            host: overrides
                .host
                .or(self.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(self.port).unwrap_or(DEFAULT_PORT),
            ip_version,
            secure: overrides.secure.or(self.secure).unwrap_or(false),
            tls_verify: overrides.tls_verify.or(self.tls_verify).unwrap_or(false),
            group_id: overrides
                .group
                .or(self.group)
                .map(|group| group.trim().to_string())
                .unwrap_or_default(),
            device_name: overrides
                .name
                .or(self.name)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            keybind_presets: self.keybind_presets,
            connect_timeout: self
                .connect_timeout_secs
                .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs),
            retry_delay: self
                .retry_delay_secs
                .map_or(DEFAULT_RETRY_DELAY, Duration::from_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
