//! # padcast-core
//!
//! Shared library for padcast containing the virtual gamepad button table,
//! the JSON protocol spoken with the group server, and the endpoint ordering
//! policy used when connecting to it.
//!
//! This crate performs no I/O.  It has zero dependencies on OS input APIs,
//! sockets, or the async runtime, so every piece of it can be tested with
//! plain `#[test]` functions.
//!
//! # Architecture overview (for beginners)
//!
//! padcast relays button presses from a group server to a *virtual gamepad*
//! on the local machine.  Players in a browser press buttons, the server
//! forwards semantic events such as `{"type":"key_event","code":"BTN_A","state":1}`
//! to every output client that joined the group, and the output client replays
//! them as if a real controller were plugged in.
//!
//! This crate (`padcast-core`) is the shared foundation.  It defines:
//!
//! - **`buttons`** – The fixed table of semantic button names (`"BTN_A"`,
//!   `"BTN_DPAD_UP"`, …) and the Linux input codes they map to.
//!
//! - **`protocol`** – The JSON messages exchanged with the server and the
//!   WebSocket handshake path an output client connects to.
//!
//! - **`domain`** – The IP-family preference policy that turns a list of
//!   resolved addresses into an ordered list of connection candidates.

pub mod buttons;
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `padcast_core::Endpoint` instead of `padcast_core::domain::endpoint::Endpoint`.
pub use buttons::{ButtonEntry, ButtonTable, GAMEPAD_BUTTONS};
pub use domain::endpoint::{select_endpoints, AddressFamily, Endpoint, IpPreference, ResolveError};
pub use protocol::messages::{
    decode_server_message, ClientMessage, KeybindPresets, OutputIdentity, ProtocolError,
    ServerMessage,
};
pub use protocol::path::output_path;
