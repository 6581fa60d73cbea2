//! Domain layer for the output client.
//!
//! - **`config`** – The immutable [`OutputConfig`] value the core runs with.
//! - **`shutdown`** – The cooperative stop flag shared by every loop.

pub mod config;
pub mod shutdown;

pub use config::{ConfigError, OutputConfig};
pub use shutdown::{ShutdownFlag, STOP_POLL_INTERVAL};
