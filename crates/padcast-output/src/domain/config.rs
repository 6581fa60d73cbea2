//! The configuration the output client runs with.
//!
//! [`OutputConfig`] is assembled once at startup by the settings layer
//! (`infrastructure::storage::settings`) from the settings file and the
//! command line, validated, and then shared read-only (behind an `Arc`) by the
//! connector and the supervisor.  Nothing mutates it after startup.

use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;

use padcast_core::protocol::{encode_query_component, output_path};
use padcast_core::{IpPreference, KeybindPresets};
use thiserror::Error;

/// Default group server host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default group server port.
pub const DEFAULT_PORT: u16 = 8000;
/// Upper bound for the TCP connect and for the TLS/WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// Pause between reconnection passes.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Errors raised when a configuration is not usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No group to join was given.
    #[error("a group id is required (set `group` in the settings file or pass --group)")]
    MissingGroupId,
    /// The IP version is not `4`, `6` or `auto` (or one of their aliases).
    #[error("invalid IP version '{0}' (use 4, 6 or auto)")]
    InvalidIpVersion(String),
    /// A timeout or delay setting is zero.
    #[error("`{0}` must be at least one second")]
    ZeroDuration(&'static str),
}

/// Everything the connection core needs to know, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Group server hostname or IP literal.
    pub host: String,
    /// Group server port.
    pub port: u16,
    /// Which address families may be used.
    pub ip_version: IpPreference,
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,
    /// Verify the server certificate and hostname when `secure` is set.
    pub tls_verify: bool,
    /// Group to join; never empty once validated.
    pub group_id: String,
    /// Display name requested for this output; the server picks one when absent.
    pub device_name: Option<String>,
    /// Presets published to the group after the initial config.
    pub keybind_presets: KeybindPresets,
    pub connect_timeout: Duration,
    pub retry_delay: Duration,
}

impl OutputConfig {
    /// Creates a configuration for `group_id` with every other field at its default.
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ip_version: IpPreference::Auto,
            secure: false,
            tls_verify: false,
            group_id: group_id.into(),
            device_name: None,
            keybind_presets: KeybindPresets::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Checks the invariants the core relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingGroupId`] if the group id is empty or
    /// whitespace only, and [`ConfigError::ZeroDuration`] if the connect
    /// timeout or the retry delay is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_id.trim().is_empty() {
            return Err(ConfigError::MissingGroupId);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("connect_timeout_secs"));
        }
        if self.retry_delay.is_zero() {
            return Err(ConfigError::ZeroDuration("retry_delay_secs"));
        }
        Ok(())
    }

    /// `host:port`, with IPv6 literals wrapped in brackets.
    pub fn authority(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Request path of the WebSocket upgrade, query string included.
    pub fn handshake_path(&self) -> String {
        output_path(&self.group_id, self.device_name.as_deref())
    }

    /// Full `ws://` or `wss://` URL of the output endpoint.
    pub fn websocket_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}{}", self.authority(), self.handshake_path())
    }

    /// Browser URL players open to join `group_id`.
    pub fn join_url(&self, group_id: &str) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!(
            "{scheme}://{}/?group_id={}",
            self.authority(),
            encode_query_component(group_id)
        )
    }
}

/// Multi-line summary printed at startup.
impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  host:          {}", self.host)?;
        writeln!(f, "  port:          {}", self.port)?;
        writeln!(f, "  ip version:    {}", self.ip_version)?;
        writeln!(f, "  secure:        {}", self.secure)?;
        writeln!(f, "  tls verify:    {}", self.tls_verify)?;
        writeln!(f, "  group:         {}", self.group_id)?;
        writeln!(
            f,
            "  device name:   {}",
            self.device_name.as_deref().unwrap_or("(auto)")
        )?;
        write!(f, "  keybind presets: {}", self.keybind_presets.len())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
