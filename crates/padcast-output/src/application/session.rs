//! One protocol session: from an open WebSocket to its closure.
//!
//! # Session states
//!
//! ```text
//! Connecting → TransportHandshake → [SecureHandshake] → ProtocolHandshake
//!     (all inside Connector::connect, bounded by the connect timeout)
//!   → AwaitingInitialConfig → MessageLoop → Closed
//!     (Session::run)
//! ```
//!
//! The [`Connector`] produces an already-upgraded socket; whether it is plain
//! TCP or TLS underneath is decided once, when the connector is built, so the
//! session itself is written against an abstract bidirectional message stream
//! ([`SessionSocket`]).  That is also what lets tests drive a session with a
//! scripted in-memory socket.
//!
//! # Message loop
//!
//! Frames are read one at a time.  The read waits at most
//! [`STOP_POLL_INTERVAL`] before the stop flag is checked again, and a
//! timed-out read is simply retried, so no frame is ever lost or torn.
//! Each text frame is decoded on its own:
//!
//! | Message         | Effect                                        |
//! |-----------------|-----------------------------------------------|
//! | `key_event`     | [`VirtualGamepad::emit`]                      |
//! | `rename_output` | local display name updated                    |
//! | `ping`          | `pong` with the same id sent back             |
//! | anything else   | debug log only                                |
//! | malformed JSON  | warning, counted as skipped, loop continues   |

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use padcast_core::{
    decode_server_message, ClientMessage, Endpoint, OutputIdentity, ProtocolError, ServerMessage,
};
use thiserror::Error;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

use crate::application::emit_buttons::{EmitOutcome, VirtualGamepad};
use crate::domain::{OutputConfig, ShutdownFlag, STOP_POLL_INTERVAL};

/// How long a best-effort close frame may take on a stop-triggered exit.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// ── Seams ─────────────────────────────────────────────────────────────────────

/// A bidirectional WebSocket message stream.
///
/// Implemented automatically for every matching type, including
/// `tokio_tungstenite::WebSocketStream` over plain or TLS transports.
pub trait SessionSocket:
    Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin + Send
{
}

impl<T> SessionSocket for T where
    T: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin + Send
{
}

/// Opens a socket to one endpoint and completes every handshake below the
/// protocol (TCP, optional TLS, WebSocket upgrade).
#[async_trait]
pub trait Connector: Send + Sync {
    type Socket: SessionSocket;

    /// # Errors
    ///
    /// Returns [`SessionError`] if the connection or a handshake fails or
    /// times out.  Such failures only affect this one attempt.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Socket, SessionError>;
}

// ── Types ─────────────────────────────────────────────────────────────────────

/// Where a connection attempt is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    TransportHandshake,
    /// TLS handshake followed by the WebSocket upgrade.  Both run in one
    /// call under one timeout, so a timeout cannot tell them apart.
    SecureHandshake,
    ProtocolHandshake,
    AwaitingInitialConfig,
    MessageLoop,
    Closed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "TCP connect",
            Self::TransportHandshake => "transport handshake",
            Self::SecureHandshake => "TLS and WebSocket handshake",
            Self::ProtocolHandshake => "WebSocket handshake",
            Self::AwaitingInitialConfig => "initial config",
            Self::MessageLoop => "message loop",
            Self::Closed => "closed",
        })
    }
}

/// Why a connection attempt or an established session ended.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The TCP connection could not be opened.
    #[error("TCP connect to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// A connect or handshake phase exceeded the connect timeout.
    #[error("{phase} with {addr} timed out")]
    TimedOut { addr: SocketAddr, phase: SessionPhase },
    /// The TLS handshake or the WebSocket upgrade was rejected.
    #[error("handshake failed: {0}")]
    Handshake(#[source] WsError),
    /// Reading the first message failed at the transport level.
    #[error("failed to read the initial config: {0}")]
    AwaitConfig(#[source] WsError),
    /// The first message was not a valid `config` message.
    #[error("invalid initial config: {0}")]
    InitialConfig(#[source] ProtocolError),
    /// The first message was valid JSON of another type.
    #[error("expected a config message first, got '{0}'")]
    UnexpectedInitialMessage(String),
    /// The server closed the connection before sending its config.
    #[error("connection closed before the initial config")]
    ClosedBeforeConfig,
    /// An outbound message could not be serialized.
    #[error("failed to encode an outbound message: {0}")]
    Encode(#[source] ProtocolError),
    /// Sending the keybind presets failed.
    #[error("failed to publish keybind presets: {0}")]
    PresetSync(#[source] WsError),
    /// The server closed an established session.
    #[error("connection closed by the server")]
    ConnectionLost,
    /// An established session failed at the transport level.
    #[error("connection error: {0}")]
    Stream(#[source] WsError),
    /// The stop flag was observed before the session was established.
    #[error("stopped before the session was established")]
    Interrupted,
}

impl SessionError {
    /// `true` if the session had reached the message loop before failing.
    pub fn reached_message_loop(&self) -> bool {
        matches!(self, Self::ConnectionLost | Self::Stream(_))
    }
}

/// What a session negotiated and processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Identity assigned by the server; the name reflects later renames.
    pub identity: OutputIdentity,
    /// Data messages received in the message loop.
    pub messages: u64,
    /// Messages that could not be decoded.
    pub skipped: u64,
    /// Button events written to the gamepad.
    pub emitted: u64,
}

impl SessionSummary {
    fn new(identity: OutputIdentity) -> Self {
        Self {
            identity,
            messages: 0,
            skipped: 0,
            emitted: 0,
        }
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "output '{}' ({}) in group {}: {} messages, {} skipped, {} buttons emitted",
            self.identity.output_device_name,
            self.identity.output_device_id,
            self.identity.group_id,
            self.messages,
            self.skipped,
            self.emitted
        )
    }
}

/// One inbound read, as seen by the session.
enum Inbound {
    Text(String),
    /// A binary frame that is not UTF-8.
    Undecodable,
    Closed,
    Stopped,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// A protocol session over one connected socket.
pub struct Session<'a, S> {
    socket: S,
    config: &'a OutputConfig,
    gamepad: &'a mut VirtualGamepad,
    shutdown: ShutdownFlag,
}

impl<'a, S: SessionSocket> Session<'a, S> {
    pub fn new(
        socket: S,
        config: &'a OutputConfig,
        gamepad: &'a mut VirtualGamepad,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            socket,
            config,
            gamepad,
            shutdown,
        }
    }

    /// Runs the session until the stop flag is observed or the connection ends.
    ///
    /// The socket is dropped (and with it the transport) on every return path.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] for every ending other than a stop request.
    /// Use [`SessionError::reached_message_loop`] to tell a dropped session
    /// from a failed attempt.
    pub async fn run(mut self) -> Result<SessionSummary, SessionError> {
        debug!("session phase: {}", SessionPhase::AwaitingInitialConfig);
        let identity = self.await_initial_config().await?;
        info!(
            "joined group {} as '{}' (device id {})",
            identity.group_id, identity.output_device_name, identity.output_device_id
        );
        info!(
            "Open {} to join group {}",
            self.config.join_url(&identity.group_id),
            identity.group_id
        );

        self.sync_presets().await?;

        debug!("session phase: {}", SessionPhase::MessageLoop);
        let mut summary = SessionSummary::new(identity);
        let result = self.message_loop(&mut summary).await;
        debug!("session phase: {}", SessionPhase::Closed);
        info!("session ended: {summary}");
        result.map(|()| summary)
    }

    async fn await_initial_config(&mut self) -> Result<OutputIdentity, SessionError> {
        let text = match self.next_inbound().await.map_err(SessionError::AwaitConfig)? {
            Inbound::Text(text) => text,
            Inbound::Undecodable => {
                return Err(SessionError::UnexpectedInitialMessage("binary".to_string()))
            }
            Inbound::Closed => return Err(SessionError::ClosedBeforeConfig),
            Inbound::Stopped => return Err(SessionError::Interrupted),
        };

        match decode_server_message(&text).map_err(SessionError::InitialConfig)? {
            ServerMessage::Config(identity) => Ok(identity),
            other => Err(SessionError::UnexpectedInitialMessage(other.kind().to_string())),
        }
    }

    async fn sync_presets(&mut self) -> Result<(), SessionError> {
        let presets = &self.config.keybind_presets;
        if presets.is_empty() {
            return Ok(());
        }

        let text = ClientMessage::SetKeybindPresets {
            keybind_presets: presets.clone(),
        }
        .to_json()
        .map_err(SessionError::Encode)?;
        self.socket
            .send(Message::Text(text))
            .await
            .map_err(SessionError::PresetSync)?;
        info!("published {} keybind preset(s)", presets.len());
        Ok(())
    }

    async fn message_loop(&mut self, summary: &mut SessionSummary) -> Result<(), SessionError> {
        loop {
            match self.next_inbound().await.map_err(SessionError::Stream)? {
                Inbound::Text(text) => self.dispatch(&text, summary).await?,
                Inbound::Undecodable => {
                    summary.messages += 1;
                    summary.skipped += 1;
                    warn!("skipping binary frame that is not UTF-8");
                }
                Inbound::Closed if self.shutdown.is_requested() => return Ok(()),
                Inbound::Closed => return Err(SessionError::ConnectionLost),
                Inbound::Stopped => {
                    self.close().await;
                    return Ok(());
                }
            }
        }
    }

    async fn dispatch(&mut self, text: &str, summary: &mut SessionSummary) -> Result<(), SessionError> {
        summary.messages += 1;
        let message = match decode_server_message(text) {
            Ok(message) => message,
            Err(e) => {
                summary.skipped += 1;
                warn!("skipping malformed message: {e}");
                return Ok(());
            }
        };

        match message {
            ServerMessage::KeyEvent { code, state } => {
                if self.gamepad.emit(&code, state) == EmitOutcome::Emitted {
                    summary.emitted += 1;
                }
            }
            ServerMessage::RenameOutput { name } => {
                info!(
                    "output renamed from '{}' to '{name}'",
                    summary.identity.output_device_name
                );
                summary.identity.output_device_name = name;
            }
            ServerMessage::Ping { id } => match (ClientMessage::Pong { id }).to_json() {
                Ok(pong) => self
                    .socket
                    .send(Message::Text(pong))
                    .await
                    .map_err(SessionError::Stream)?,
                Err(e) => warn!("could not encode pong: {e}"),
            },
            ServerMessage::Config(_) => debug!("ignoring repeated config message"),
            ServerMessage::Other { kind } => debug!("ignoring message of type '{kind}'"),
        }
        Ok(())
    }

    /// Reads the next data frame, waking every [`STOP_POLL_INTERVAL`] to check
    /// the stop flag.  Control frames are skipped.
    async fn next_inbound(&mut self) -> Result<Inbound, WsError> {
        loop {
            if self.shutdown.is_requested() {
                return Ok(Inbound::Stopped);
            }
            let frame = match timeout(STOP_POLL_INTERVAL, self.socket.next()).await {
                Err(_elapsed) => continue,
                Ok(None) => return Ok(Inbound::Closed),
                Ok(Some(frame)) => frame?,
            };
            match frame {
                Message::Text(text) => return Ok(Inbound::Text(text)),
                Message::Binary(bytes) => {
                    return Ok(String::from_utf8(bytes).map_or(Inbound::Undecodable, Inbound::Text))
                }
                Message::Close(frame) => {
                    debug!("server sent close frame: {frame:?}");
                    return Ok(Inbound::Closed);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    /// Sends a close frame, best effort.
    async fn close(&mut self) {
        match timeout(CLOSE_TIMEOUT, self.socket.close()).await {
            Ok(Ok(())) => debug!("close frame sent"),
            Ok(Err(e)) => debug!("close frame not delivered: {e}"),
            Err(_elapsed) => debug!("close frame timed out"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
