//! Reconnection supervisor: the outer loop of the output client.
//!
//! # One pass (for beginners)
//!
//! ```text
//! resolve host ──fail──────────────────────────────┐
//!     │                                            │
//!     ▼                                            │
//! for each endpoint (IPv6 first under "auto"):     │
//!     connect ──fail──▶ log family + error, next   │
//!     run session                                  │
//!       ├─ failed or dropped ─▶ log family, next   │
//!       └─ stopped ─▶ return                       │
//! all endpoints failed ────────────────────────────┤
//!                                                  ▼
//!                                   wait retry delay (3 s), then next pass
//! ```
//!
//! A session that drops after reaching the message loop counts as one more
//! failed endpoint: the pass moves on to the next address instead of
//! reconnecting to the one that just dropped.  A fresh resolve happens only
//! once the list is exhausted.
//!
//! The delay is the same after every kind of failure and does not grow:
//! retries are infrequent enough at 3 s that a backoff would only slow down
//! recovery when the server comes back.  The delay is slept in stop-flag
//! slices, so Ctrl+C during the wait returns within one slice.

use std::sync::Arc;

use async_trait::async_trait;
use padcast_core::{Endpoint, IpPreference, ResolveError};
use tracing::{debug, info, warn};

use crate::application::emit_buttons::VirtualGamepad;
use crate::application::session::{Connector, Session, SessionSummary};
use crate::domain::{OutputConfig, ShutdownFlag};

/// Turns a host and port into ordered connection candidates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the lookup fails or nothing matches
    /// `preference`.
    async fn resolve(
        &self,
        host: &str,
        port: u16,
        preference: IpPreference,
    ) -> Result<Vec<Endpoint>, ResolveError>;
}

/// How one pass over the endpoint list ended.
#[derive(Debug)]
enum PassOutcome {
    /// The stop flag was observed; carries the summary of a cleanly stopped session.
    Stopped(Option<SessionSummary>),
    /// Every endpoint failed, either before or after reaching the message loop.
    AllFailed,
    /// The host could not be resolved.
    ResolveFailed,
}

/// Owns the resolve → connect → session → retry loop.
pub struct Supervisor<R, C> {
    config: Arc<OutputConfig>,
    resolver: R,
    connector: C,
    shutdown: ShutdownFlag,
}

impl<R: EndpointResolver, C: Connector> Supervisor<R, C> {
    pub fn new(config: Arc<OutputConfig>, resolver: R, connector: C, shutdown: ShutdownFlag) -> Self {
        Self {
            config,
            resolver,
            connector,
            shutdown,
        }
    }

    /// Runs until the stop flag is set.
    ///
    /// Returns the summary of the session that was active when the stop was
    /// observed, if any.  Network failures never end the loop.
    pub async fn run(&self, gamepad: &mut VirtualGamepad) -> Option<SessionSummary> {
        let delay = self.config.retry_delay;
        let mut last_summary = None;

        while !self.shutdown.is_requested() {
            match self.run_pass(gamepad).await {
                PassOutcome::Stopped(summary) => {
                    last_summary = summary;
                    break;
                }
                PassOutcome::AllFailed => warn!("all endpoints failed; retrying in {delay:?}"),
                PassOutcome::ResolveFailed => info!("retrying in {delay:?}"),
            }

            if !self.shutdown.sleep(delay).await {
                break;
            }
        }

        info!("reconnection supervisor stopped");
        last_summary
    }

    async fn run_pass(&self, gamepad: &mut VirtualGamepad) -> PassOutcome {
        let config = &self.config;
        let endpoints = match self
            .resolver
            .resolve(&config.host, config.port, config.ip_version)
            .await
        {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!("could not resolve {}: {e}", config.host);
                return PassOutcome::ResolveFailed;
            }
        };
        debug!("resolved {} to {} endpoint(s)", config.host, endpoints.len());

        for endpoint in &endpoints {
            if self.shutdown.is_requested() {
                return PassOutcome::Stopped(None);
            }

            info!("connecting to {} via {endpoint}", config.websocket_url());
            let socket = match self.connector.connect(endpoint).await {
                Ok(socket) => socket,
                Err(e) => {
                    warn!("{} connection to {} failed: {e}", endpoint.family, endpoint.addr);
                    continue;
                }
            };
            info!("connected to {endpoint}");

            let session = Session::new(socket, config, gamepad, self.shutdown.clone());
            match session.run().await {
                Ok(summary) => return PassOutcome::Stopped(Some(summary)),
                Err(e) if self.shutdown.is_requested() => {
                    debug!("session ended during shutdown: {e}");
                    return PassOutcome::Stopped(None);
                }
                Err(e) if e.reached_message_loop() => {
                    warn!("{} connection to {} lost: {e}", endpoint.family, endpoint.addr);
                }
                Err(e) => {
                    warn!("{} session with {} failed: {e}", endpoint.family, endpoint.addr);
                }
            }
        }

        PassOutcome::AllFailed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
