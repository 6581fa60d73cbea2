//! WebSocket connector: TCP, optional TLS, then the WebSocket upgrade.
//!
//! # Why connect to an address instead of a URL?
//!
//! `tokio_tungstenite::connect_async` resolves the URL host itself and picks
//! an address on its own.  The supervisor needs to decide the order in which
//! addresses are tried (IPv6 first, fall through on failure), so this
//! connector opens the TCP stream to one already-resolved endpoint and then
//! hands that stream to `client_async_tls_with_config`.  The request URL still
//! carries the configured hostname, which becomes the `Host` header and the
//! TLS server name (SNI).
//!
//! # TLS trust
//!
//! Output clients usually talk to a group server on the local network with a
//! self-signed certificate, so peer verification is off unless `tls_verify` is
//! set.  With verification off the channel is encrypted but the server is not
//! authenticated.

use std::sync::Arc;

use async_trait::async_trait;
use padcast_core::Endpoint;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    client_async_tls_with_config,
    tungstenite::{
        client::IntoClientRequest,
        handshake::client::Request,
        http::{header::USER_AGENT, HeaderValue},
        Error as WsError,
    },
    Connector as TransportMode, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};

use crate::application::session::{Connector, SessionError, SessionPhase};
use crate::domain::OutputConfig;

/// `User-Agent` sent with every WebSocket upgrade.
pub const CLIENT_USER_AGENT: &str = concat!("padcast-output/", env!("CARGO_PKG_VERSION"));

/// Connects to the group server described by an [`OutputConfig`].
pub struct WsConnector {
    config: Arc<OutputConfig>,
    /// `Some` when the configuration asks for a secure transport.
    tls: Option<native_tls::TlsConnector>,
}

impl WsConnector {
    /// Builds the connector, including the TLS configuration when `secure` is set.
    ///
    /// # Errors
    ///
    /// Returns the `native_tls` error if the TLS backend cannot be initialised.
    pub fn new(config: Arc<OutputConfig>) -> Result<Self, native_tls::Error> {
        let tls = if config.secure {
            if !config.tls_verify {
                warn!("TLS peer verification is disabled; the server will not be authenticated");
            }
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(!config.tls_verify)
                .danger_accept_invalid_hostnames(!config.tls_verify)
                .build()?;
            Some(connector)
        } else {
            None
        };
        Ok(Self { config, tls })
    }

    /// The upgrade request: configured URL plus the client `User-Agent`.
    fn request(&self) -> Result<Request, WsError> {
        let mut request = self.config.websocket_url().into_client_request()?;
        request
            .headers_mut()
            .insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        Ok(request)
    }

    fn transport_mode(&self) -> TransportMode {
        match &self.tls {
            Some(tls) => TransportMode::NativeTls(tls.clone()),
            None => TransportMode::Plain,
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Socket, SessionError> {
        let addr = endpoint.addr;
        let limit = self.config.connect_timeout;

        debug!("{} to {addr}", SessionPhase::Connecting);
        let stream = timeout(limit, TcpStream::connect(addr))
            .await
            .map_err(|_| SessionError::TimedOut {
                addr,
                phase: SessionPhase::Connecting,
            })?
            .map_err(|source| SessionError::Connect { addr, source })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("could not set TCP_NODELAY: {e}");
        }
        debug!("{} complete with {addr}", SessionPhase::TransportHandshake);

        let phase = if self.tls.is_some() {
            SessionPhase::SecureHandshake
        } else {
            SessionPhase::ProtocolHandshake
        };
        debug!("{phase} with {addr}");

        let request = self.request().map_err(SessionError::Handshake)?;
        let (socket, response) = timeout(
            limit,
            client_async_tls_with_config(request, stream, None, Some(self.transport_mode())),
        )
        .await
        .map_err(|_| SessionError::TimedOut { addr, phase })?
        .map_err(SessionError::Handshake)?;

        debug!("upgrade accepted with status {}", response.status());
        Ok(socket)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
