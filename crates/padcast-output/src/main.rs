//! padcast output client: entry point.
//!
//! This binary joins a group on a padcast server over WebSocket and replays
//! the button events the server forwards on a virtual gamepad, so that games
//! on this machine see an ordinary controller.
//!
//! # Usage
//!
//! ```text
//! padcast-output [OPTIONS]
//!
//! Options:
//!   --settings    <PATH>   Settings file [default: settings.toml, optional]
//!   --host        <HOST>   Group server hostname or IP [default: localhost]
//!   --port        <PORT>   Group server port [default: 8000]
//!   --ip-version  <VER>    4, 6 or auto [default: auto]
//!   --secure [<BOOL>]      Use wss:// instead of ws://
//!   --tls-verify [<BOOL>]  Verify the server certificate (with --secure)
//!   --group       <ID>     Group to join (required)
//!   --name        <NAME>   Requested output device name
//!   --log-level   <LEVEL>  error, warn, info, debug or trace [default: info]
//! ```
//!
//! # Environment variable overrides
//!
//! Every option can also be set with a `PADCAST_*` variable (`PADCAST_HOST`,
//! `PADCAST_GROUP`, …).  Precedence is: command line, environment, settings
//! file, built-in default.  `RUST_LOG`, when set, replaces the log level
//! entirely.
//!
//! # Architecture overview
//!
//! ```text
//! group server  (JSON over WebSocket, /ws/output?group_id=…)
//!       ↕
//! padcast-output  ← this process
//!   domain/          OutputConfig, ShutdownFlag
//!   application/     Session, Supervisor, VirtualGamepad
//!   infrastructure/
//!     network/       resolver + WebSocket connector
//!     gamepad/       uinput device
//!     storage/       settings file
//!     signals        Ctrl+C / SIGTERM
//!       ↕
//! /dev/uinput  →  games on this machine
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use padcast_output::application::emit_buttons::VirtualGamepad;
use padcast_output::application::reconnect::Supervisor;
use padcast_output::domain::ShutdownFlag;
use padcast_output::infrastructure::gamepad::create_platform_gamepad;
use padcast_output::infrastructure::network::{SystemResolver, WsConnector};
use padcast_output::infrastructure::signals::spawn_signal_listener;
use padcast_output::infrastructure::storage::{
    load_settings, CliOverrides, SettingsFile, DEFAULT_SETTINGS_PATH,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// padcast output client.
///
/// Joins a group on a padcast server and replays its button events on a
/// virtual gamepad.
#[derive(Debug, Parser)]
#[command(
    name = "padcast-output",
    about = "Replays a padcast group's button events on a virtual gamepad",
    version
)]
struct Cli {
    /// Settings file.  Without this flag `settings.toml` is read if present.
    #[arg(long, env = "PADCAST_SETTINGS")]
    settings: Option<PathBuf>,

    /// Hostname or IP address of the group server.
    #[arg(long, env = "PADCAST_HOST")]
    host: Option<String>,

    /// TCP port of the group server.
    #[arg(long, env = "PADCAST_PORT")]
    port: Option<u16>,

    /// Address family to connect with: `4`, `6` or `auto`.
    ///
    /// `auto` tries IPv6 addresses first and falls back to IPv4.
    #[arg(long, env = "PADCAST_IP_VERSION")]
    ip_version: Option<String>,

    /// Connect with `wss://` (TLS) instead of `ws://`.
    #[arg(long, env = "PADCAST_SECURE", num_args = 0..=1, default_missing_value = "true")]
    secure: Option<bool>,

    /// Verify the server certificate and hostname when `--secure` is set.
    #[arg(long, env = "PADCAST_TLS_VERIFY", num_args = 0..=1, default_missing_value = "true")]
    tls_verify: Option<bool>,

    /// Group to join.
    #[arg(long, env = "PADCAST_GROUP")]
    group: Option<String>,

    /// Output device name to request from the server.
    #[arg(long, env = "PADCAST_NAME")]
    name: Option<String>,

    /// Log level or `tracing` filter directive.  `RUST_LOG` takes precedence.
    #[arg(long, env = "PADCAST_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Settings path and whether the user named it explicitly.
    fn settings_path(&self) -> (PathBuf, bool) {
        match &self.settings {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_PATH), false),
        }
    }

    /// Log filter: command line, then settings file, then `info`.
    fn log_level(&self, settings: &SettingsFile) -> String {
        self.log_level
            .clone()
            .or_else(|| settings.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.host.clone(),
            port: self.port,
            ip_version: self.ip_version.clone(),
            secure: self.secure,
            tls_verify: self.tls_verify,
            group: self.group.clone(),
            name: self.name.clone(),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed and the settings file is loaded.
/// 2. `tracing_subscriber` is initialised.  `RUST_LOG` wins over the
///    configured level; an invalid level falls back to `info`.
/// 3. The settings and CLI values are merged into an `OutputConfig`.  A
///    missing group is fatal here, before any device is created.
/// 4. A signal listener is spawned; it sets the shared stop flag.
/// 5. The virtual gamepad is created.  Failure is fatal.
/// 6. The supervisor runs until the stop flag is set, then the gamepad is
///    dropped, which removes the device.
///
/// A single-threaded runtime is enough: there is one connection at a time
/// and the gamepad has a single owner.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings_path, explicit) = cli.settings_path();
    let settings = load_settings(&settings_path, explicit)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    let level = cli.log_level(&settings);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = settings
        .into_config(cli.overrides())
        .context("invalid configuration")?;
    let config = Arc::new(config);
    info!("padcast output client starting with:\n{config}");

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let shutdown = ShutdownFlag::new();
    spawn_signal_listener(shutdown.clone());

    // ── Virtual gamepad ───────────────────────────────────────────────────────
    let device = create_platform_gamepad().context("failed to create the virtual gamepad")?;
    let mut gamepad = VirtualGamepad::new(device);
    info!(
        "virtual gamepad ready; buttons: {}",
        gamepad.buttons().all_names().collect::<Vec<_>>().join(", ")
    );

    // ── Reconnect loop ────────────────────────────────────────────────────────
    let connector =
        WsConnector::new(Arc::clone(&config)).context("failed to initialise TLS support")?;
    let supervisor = Supervisor::new(config, SystemResolver, connector, shutdown);

    if let Some(summary) = supervisor.run(&mut gamepad).await {
        info!("last session: {summary}");
    }

    drop(gamepad);
    info!("shutdown complete");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
