//! Group server protocol: JSON message types and the handshake path.

pub mod messages;
pub mod path;

pub use messages::{
    decode_server_message, ClientMessage, KeybindPresets, OutputIdentity, ProtocolError,
    ServerMessage,
};
pub use path::{encode_query_component, output_path, OUTPUT_ENDPOINT};
