//! padcast-output library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does padcast-output do? (for beginners)
//!
//! An *output client* is the machine where the game runs.  It joins a named
//! group on the padcast server, and every button that players press in their
//! browsers arrives here as a small JSON message.  The output client replays
//! each one on a virtual gamepad, so the game sees an ordinary controller.
//!
//! The client:
//!
//! 1. Creates one virtual gamepad for the whole process lifetime.
//! 2. Resolves the server host to a list of endpoints, IPv6 first by default.
//! 3. Connects over WebSocket (optionally TLS) to `/ws/output?group_id=…`.
//! 4. Waits for the server's `config` message, then publishes its keybind
//!    presets.
//! 5. Replays every `key_event` on the gamepad, in arrival order.
//! 6. Reconnects after a fixed delay whenever the connection is lost, until
//!    Ctrl+C or SIGTERM arrives.

/// Domain layer: configuration and the process-wide stop flag.
pub mod domain;

/// Application layer: device sink, protocol session and reconnection supervisor.
pub mod application;

/// Infrastructure layer: uinput device, network, settings file and signals.
pub mod infrastructure;
