//! Infrastructure layer for the output client.
//!
//! Contains OS-facing adapters: the uinput gamepad, DNS resolution and the
//! WebSocket connector, the settings file and process signals.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `padcast_core`, but MUST NOT be imported by the `application` or domain
//! layers (tests excepted, which borrow the mocks).
//!
//! # Sub-modules
//!
//! - **`gamepad`** – `GamepadDevice` implementations.  The uinput device is
//!   compiled on Linux only; a recording `MockGamepad` is always available.
//!
//! - **`network`** – `SystemResolver` (DNS + IP preference) and `WsConnector`
//!   (TCP, optional TLS, WebSocket upgrade), plus scripted test doubles.
//!
//! - **`storage`** – The TOML settings file and its merge with command-line
//!   overrides.
//!
//! - **`signals`** – Ctrl+C / SIGTERM listener that sets the stop flag.

pub mod gamepad;
pub mod network;
pub mod signals;
pub mod storage;
