//! Application layer use cases for the output client.
//!
//! - **`emit_buttons`** – Translates semantic button events into device
//!   writes.  The actual device is a `GamepadDevice` implementation injected
//!   at construction time.
//!
//! - **`session`** – Runs one protocol session over a connected WebSocket:
//!   initial config, preset sync and the message loop.
//!
//! - **`reconnect`** – The supervisor that resolves, tries each endpoint in
//!   order and retries after a fixed delay until shutdown.

pub mod emit_buttons;
#[cfg(test)]
mod log_capture;
pub mod reconnect;
pub mod session;
