//! Process signal handling.
//!
//! A spawned task waits for Ctrl+C (SIGINT) and, on Unix, SIGTERM, the signal
//! service managers send on stop.  The first one received sets the stop flag;
//! the loops notice it within one poll slice and the process exits cleanly,
//! releasing the virtual gamepad on the way out.

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::ShutdownFlag;

/// Spawns the signal listener.  Must be called from within a Tokio runtime.
pub fn spawn_signal_listener(shutdown: ShutdownFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                info!("received {name}; initiating graceful shutdown");
                shutdown.request();
            }
            Err(e) => error!("failed to listen for shutdown signals: {e}"),
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "Ctrl+C"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "Ctrl+C")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
