//! Network infrastructure for the output client.
//!
//! - `SystemResolver` resolves the server host with the OS resolver and
//!   applies the IP-family preference.
//! - `WsConnector` opens the TCP stream, performs the optional TLS handshake
//!   and the WebSocket upgrade, each bounded by the connect timeout.
//! - `mock` holds scripted stand-ins for both, used by tests.

pub mod connector;
pub mod mock;
pub mod resolver;

pub use connector::{WsConnector, CLIENT_USER_AGENT};
pub use resolver::SystemResolver;
