//! Virtual device sink: replays semantic button events on the gamepad.
//!
//! This use case sits at the application layer and delegates the actual
//! device writes to a [`GamepadDevice`] trait object.  The uinput
//! implementation lives in `infrastructure::gamepad::linux`; tests use the
//! recording `MockGamepad`.
//!
//! # Event sequence
//!
//! A known button produces exactly two device writes, in this order:
//!
//! ```text
//! EV_KEY  <code>  <state>     (1 = pressed, 0 = released)
//! EV_SYN  SYN_REPORT  0       (tells readers the report is complete)
//! ```
//!
//! An unknown button name produces no writes at all, only a warning.

use padcast_core::{ButtonTable, GAMEPAD_BUTTONS};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Error type for virtual device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The uinput device node could not be opened.
    #[error("cannot open uinput (is the uinput module loaded and writable?): {0}")]
    Unavailable(#[source] std::io::Error),
    /// The device could not be configured or registered with the kernel.
    #[error("failed to register virtual gamepad: {0}")]
    Register(#[source] std::io::Error),
    /// A write to an existing device failed.
    #[error("device write failed: {0}")]
    Write(#[source] std::io::Error),
    /// This platform has no virtual input facility.
    #[error("virtual gamepads are not supported on this platform")]
    Unsupported,
}

/// Low-level access to one virtual input device.
///
/// Each supported OS provides an implementation in the infrastructure layer.
/// The handle is released when the implementation is dropped.
pub trait GamepadDevice: Send {
    /// Writes one key state change.
    fn write_key(&mut self, code: u16, state: i32) -> Result<(), DeviceError>;

    /// Writes the synchronization report that completes a key write.
    fn write_sync(&mut self) -> Result<(), DeviceError>;
}

/// What [`VirtualGamepad::emit`] did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Key and sync were written.
    Emitted,
    /// The name is not in the button table; nothing was written.
    UnknownButton,
    /// The device rejected a write; the error was logged.
    WriteFailed,
}

/// The one virtual gamepad owned by the process.
///
/// Accessed by a single caller at a time, so it is not locked.
pub struct VirtualGamepad {
    device: Box<dyn GamepadDevice>,
    buttons: &'static ButtonTable,
}

impl VirtualGamepad {
    /// Wraps a device that was registered with [`GAMEPAD_BUTTONS`].
    pub fn new(device: Box<dyn GamepadDevice>) -> Self {
        Self::with_buttons(device, &GAMEPAD_BUTTONS)
    }

    pub fn with_buttons(device: Box<dyn GamepadDevice>, buttons: &'static ButtonTable) -> Self {
        Self { device, buttons }
    }

    /// The button table this gamepad translates names with.
    pub fn buttons(&self) -> &'static ButtonTable {
        self.buttons
    }

    /// Applies one button event.
    ///
    /// Never fails: unknown names and device errors are logged and reported
    /// through the returned [`EmitOutcome`].
    pub fn emit(&mut self, name: &str, state: i32) -> EmitOutcome {
        let Some(code) = self.buttons.lookup(name) else {
            warn!("unknown button '{name}', ignoring event");
            return EmitOutcome::UnknownButton;
        };

        match self.write(code, state) {
            Ok(()) => {
                debug!("emitted {name} (0x{code:03x}) state={state}");
                EmitOutcome::Emitted
            }
            Err(e) => {
                error!("failed to emit {name} state={state}: {e}");
                EmitOutcome::WriteFailed
            }
        }
    }

    fn write(&mut self, code: u16, state: i32) -> Result<(), DeviceError> {
        self.device.write_key(code, state)?;
        self.device.write_sync()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::application::log_capture::WarnCounter;

    // ── Recording device ──────────────────────────────────────────────────────

    #[derive(Debug, Clone, PartialEq)]
    enum Write {
        Key(u16, i32),
        Sync,
    }

    #[derive(Default)]
    struct RecordingDevice {
        writes: Arc<Mutex<Vec<Write>>>,
        fail_sync: bool,
    }

    impl GamepadDevice for RecordingDevice {
        fn write_key(&mut self, code: u16, state: i32) -> Result<(), DeviceError> {
            self.writes.lock().unwrap().push(Write::Key(code, state));
            Ok(())
        }

        fn write_sync(&mut self) -> Result<(), DeviceError> {
            if self.fail_sync {
                return Err(DeviceError::Write(std::io::Error::other("injected failure")));
            }
            self.writes.lock().unwrap().push(Write::Sync);
            Ok(())
        }
    }

    fn gamepad(fail_sync: bool) -> (VirtualGamepad, Arc<Mutex<Vec<Write>>>) {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let device = RecordingDevice {
            writes: Arc::clone(&writes),
            fail_sync,
        };
        (VirtualGamepad::new(Box::new(device)), writes)
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_known_button_writes_key_then_sync() {
        // Arrange
        let (mut pad, writes) = gamepad(false);

        // Act
        let outcome = pad.emit("BTN_A", 1);

        // Assert
        assert_eq!(outcome, EmitOutcome::Emitted);
        assert_eq!(*writes.lock().unwrap(), vec![Write::Key(0x130, 1), Write::Sync]);
    }

    #[test]
    fn test_release_passes_state_through() {
        let (mut pad, writes) = gamepad(false);

        pad.emit("BTN_DPAD_LEFT", 0);

        assert_eq!(*writes.lock().unwrap(), vec![Write::Key(0x222, 0), Write::Sync]);
    }

    #[test]
    fn test_unknown_button_writes_nothing() {
        // Arrange
        let (mut pad, writes) = gamepad(false);

        let warnings = WarnCounter::default();

        // Act
        let outcome = tracing::subscriber::with_default(warnings.subscriber(), || {
            pad.emit("BTN_TURBO", 1)
        });

        // Assert
        assert_eq!(outcome, EmitOutcome::UnknownButton);
        assert!(writes.lock().unwrap().is_empty());
        assert_eq!(warnings.count(), 1);
    }

    #[test]
    fn test_known_button_logs_no_warning() {
        let (mut pad, _writes) = gamepad(false);
        let warnings = WarnCounter::default();

        tracing::subscriber::with_default(warnings.subscriber(), || pad.emit("BTN_Y", 1));

        assert_eq!(warnings.count(), 0);
    }

    #[test]
    fn test_lowercase_name_is_unknown() {
        let (mut pad, _writes) = gamepad(false);
        assert_eq!(pad.emit("btn_a", 1), EmitOutcome::UnknownButton);
    }

    #[test]
    fn test_failed_sync_is_reported_not_propagated() {
        // Arrange
        let (mut pad, writes) = gamepad(true);

        // Act
        let outcome = pad.emit("BTN_START", 1);

        // Assert: the key write happened, the sync did not, and emit still returned.
        assert_eq!(outcome, EmitOutcome::WriteFailed);
        assert_eq!(*writes.lock().unwrap(), vec![Write::Key(0x13b, 1)]);
    }

    #[test]
    fn test_gamepad_exposes_default_button_table() {
        let (pad, _writes) = gamepad(false);
        assert_eq!(pad.buttons().len(), 17);
    }
}
