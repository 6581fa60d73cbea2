//! Scripted network doubles for tests.
//!
//! # Why scripted sockets?
//!
//! A real WebSocket needs a server, a port and real time.  Most session and
//! supervisor tests only care about *which frames arrive in which order*, so
//! [`ScriptedSocket`] plays back a fixed list of inbound frames and records
//! everything the session sends.  What happens once the script runs out is
//! configurable: the socket can close, hang, or request shutdown and hang.
//!
//! [`ScriptedConnector`] hands out scripted sockets in order and records every
//! endpoint it was asked for; [`StaticResolver`] answers every lookup from a
//! fixed address list and counts the calls.
//!
//! # Usage in tests
//!
//! ```ignore
//! let shutdown = ShutdownFlag::new();
//! let socket = ScriptedSocket::from_texts([CONFIG, KEY_EVENT])
//!     .stop_when_drained(shutdown.clone());
//! let sent = socket.sent_log();
//!
//! Session::new(socket, &config, &mut gamepad, shutdown).run().await?;
//!
//! assert!(sent.texts().is_empty());
//! ```

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::{Sink, Stream};
use padcast_core::{select_endpoints, Endpoint, IpPreference, ResolveError};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::application::reconnect::EndpointResolver;
use crate::application::session::{Connector, SessionError};
use crate::domain::ShutdownFlag;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Sent log ──────────────────────────────────────────────────────────────────

/// Shared record of the frames a [`ScriptedSocket`] was asked to send.
#[derive(Debug, Clone, Default)]
pub struct SentLog(Arc<Mutex<Vec<Message>>>);

impl SentLog {
    /// Every frame, close frames included.
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.0).clone()
    }

    /// Only the text frames.
    pub fn texts(&self) -> Vec<String> {
        lock(&self.0)
            .iter()
            .filter_map(|message| match message {
                Message::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, message: Message) {
        lock(&self.0).push(message);
    }
}

// ── Socket ────────────────────────────────────────────────────────────────────

/// What the socket does once every scripted frame was read.
#[derive(Debug, Clone)]
enum WhenDrained {
    Close,
    Hang,
    Stop(ShutdownFlag),
}

/// In-memory WebSocket that plays back scripted inbound frames.
#[derive(Debug)]
pub struct ScriptedSocket {
    inbound: VecDeque<Result<Message, WsError>>,
    sent: SentLog,
    when_drained: WhenDrained,
    fail_sends: bool,
}

impl Default for ScriptedSocket {
    fn default() -> Self {
        Self {
            inbound: VecDeque::new(),
            sent: SentLog::default(),
            when_drained: WhenDrained::Close,
            fail_sends: false,
        }
    }
}

impl ScriptedSocket {
    /// An empty script that closes immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// A script of text frames.
    pub fn from_texts<I, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        texts
            .into_iter()
            .fold(Self::new(), |socket, text| socket.push_text(text))
    }

    pub fn push_text(self, text: impl Into<String>) -> Self {
        self.push(Message::Text(text.into()))
    }

    pub fn push(mut self, message: Message) -> Self {
        self.inbound.push_back(Ok(message));
        self
    }

    /// Queues a transport error at this point of the script.
    pub fn push_error(mut self, error: WsError) -> Self {
        self.inbound.push_back(Err(error));
        self
    }

    /// After the script, never yield another frame.
    pub fn hang_when_drained(mut self) -> Self {
        self.when_drained = WhenDrained::Hang;
        self
    }

    /// After the script, request shutdown and never yield another frame.
    pub fn stop_when_drained(mut self, shutdown: ShutdownFlag) -> Self {
        self.when_drained = WhenDrained::Stop(shutdown);
        self
    }

    /// Make every send fail with `ConnectionClosed`.
    pub fn fail_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn sent_log(&self) -> SentLog {
        self.sent.clone()
    }
}

impl Stream for ScriptedSocket {
    type Item = Result<Message, WsError>;

    /// A hanging socket returns `Pending` without registering a waker; the
    /// session's poll timeout wakes the task again.
    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(item) = this.inbound.pop_front() {
            return Poll::Ready(Some(item));
        }
        match &this.when_drained {
            WhenDrained::Close => Poll::Ready(None),
            WhenDrained::Hang => Poll::Pending,
            WhenDrained::Stop(shutdown) => {
                shutdown.request();
                Poll::Pending
            }
        }
    }
}

impl Sink<Message> for ScriptedSocket {
    type Error = WsError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: Message) -> Result<(), WsError> {
        let this = self.get_mut();
        if this.fail_sends {
            return Err(WsError::ConnectionClosed);
        }
        this.sent.push(item);
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
        Poll::Ready(Ok(()))
    }

    /// Records a close frame, like a WebSocket initiating the close handshake.
    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
        self.get_mut().sent.push(Message::Close(None));
        Poll::Ready(Ok(()))
    }
}

// ── Connector ─────────────────────────────────────────────────────────────────

/// Hands out scripted sockets in order; refuses when none are left.
#[derive(Debug, Default)]
pub struct ScriptedConnector {
    sockets: Mutex<VecDeque<ScriptedSocket>>,
    refused: Vec<SocketAddr>,
    attempts: Arc<Mutex<Vec<Endpoint>>>,
}

impl ScriptedConnector {
    pub fn new(sockets: impl IntoIterator<Item = ScriptedSocket>) -> Self {
        Self {
            sockets: Mutex::new(sockets.into_iter().collect()),
            ..Self::default()
        }
    }

    /// A connector that refuses every endpoint.
    pub fn refusing_all() -> Self {
        Self::default()
    }

    /// Refuse `addr` without consuming a scripted socket.
    pub fn refuse(mut self, addr: SocketAddr) -> Self {
        self.refused.push(addr);
        self
    }

    /// Every endpoint `connect` was called with, in order.
    pub fn attempts(&self) -> Arc<Mutex<Vec<Endpoint>>> {
        Arc::clone(&self.attempts)
    }
}

fn refused(addr: SocketAddr) -> SessionError {
    SessionError::Connect {
        addr,
        source: std::io::ErrorKind::ConnectionRefused.into(),
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Socket = ScriptedSocket;

    async fn connect(&self, endpoint: &Endpoint) -> Result<ScriptedSocket, SessionError> {
        lock(&self.attempts).push(*endpoint);
        if self.refused.contains(&endpoint.addr) {
            return Err(refused(endpoint.addr));
        }
        let next = lock(&self.sockets).pop_front();
        next.ok_or_else(|| refused(endpoint.addr))
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// Answers every lookup from a fixed address list, applying the preference.
#[derive(Debug, Default)]
pub struct StaticResolver {
    addrs: Vec<SocketAddr>,
    calls: Arc<AtomicUsize>,
}

impl StaticResolver {
    pub fn new(addrs: impl IntoIterator<Item = SocketAddr>) -> Self {
        Self {
            addrs: addrs.into_iter().collect(),
            calls: Arc::default(),
        }
    }

    /// Shared counter of `resolve` calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl EndpointResolver for StaticResolver {
    async fn resolve(
        &self,
        _host: &str,
        _port: u16,
        preference: IpPreference,
    ) -> Result<Vec<Endpoint>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        select_endpoints(self.addrs.iter().copied(), preference)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
