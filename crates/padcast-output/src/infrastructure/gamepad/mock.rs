//! Recording gamepad for tests.
//!
//! # Why a mock gamepad?
//!
//! The uinput gamepad needs `/dev/uinput`, root-level permissions and a Linux
//! kernel, and the events it produces cannot be observed from Rust test code.
//! `MockGamepad` records every write in a shared [`DeviceJournal`] instead,
//! so tests can assert exactly what was written and in which order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let device = MockGamepad::new();
//! let journal = device.journal();
//! let mut gamepad = VirtualGamepad::new(Box::new(device));
//!
//! gamepad.emit("BTN_A", 1);
//!
//! assert_eq!(
//!     journal.writes(),
//!     vec![DeviceWrite::Key { code: 0x130, value: 1 }, DeviceWrite::Sync]
//! );
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::emit_buttons::{DeviceError, GamepadDevice};

/// One recorded device write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceWrite {
    Key { code: u16, value: i32 },
    Sync,
}

/// Shared, cloneable record of the writes a [`MockGamepad`] received.
///
/// Stays readable after the gamepad itself has been moved into a
/// `VirtualGamepad`.
#[derive(Debug, Clone, Default)]
pub struct DeviceJournal(Arc<Mutex<Vec<DeviceWrite>>>);

impl DeviceJournal {
    /// Snapshot of every write so far.
    pub fn writes(&self) -> Vec<DeviceWrite> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, write: DeviceWrite) {
        self.lock().push(write);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DeviceWrite>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A gamepad that records writes instead of touching the OS.
#[derive(Debug, Default)]
pub struct MockGamepad {
    journal: DeviceJournal,
    /// When `true`, `write_key` fails without recording anything.
    pub fail_key_writes: bool,
    /// When `true`, `write_sync` fails without recording anything.
    pub fail_sync_writes: bool,
}

impl MockGamepad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the journal; clone it before moving the gamepad.
    pub fn journal(&self) -> DeviceJournal {
        self.journal.clone()
    }
}

impl GamepadDevice for MockGamepad {
    fn write_key(&mut self, code: u16, state: i32) -> Result<(), DeviceError> {
        if self.fail_key_writes {
            return Err(DeviceError::Write(std::io::Error::other("mock key write failure")));
        }
        self.journal.push(DeviceWrite::Key { code, value: state });
        Ok(())
    }

    fn write_sync(&mut self) -> Result<(), DeviceError> {
        if self.fail_sync_writes {
            return Err(DeviceError::Write(std::io::Error::other("mock sync failure")));
        }
        self.journal.push(DeviceWrite::Sync);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::emit_buttons::{EmitOutcome, VirtualGamepad};

    #[test]
    fn test_journal_survives_move_into_virtual_gamepad() {
        // Arrange
        let device = MockGamepad::new();
        let journal = device.journal();
        let mut gamepad = VirtualGamepad::new(Box::new(device));

        // Act
        gamepad.emit("BTN_TR2", 1);
        gamepad.emit("BTN_TR2", 0);

        // Assert
        assert_eq!(
            journal.writes(),
            vec![
                DeviceWrite::Key { code: 0x139, value: 1 },
                DeviceWrite::Sync,
                DeviceWrite::Key { code: 0x139, value: 0 },
                DeviceWrite::Sync,
            ]
        );
    }

    #[test]
    fn test_failing_key_write_records_nothing() {
        let device = MockGamepad {
            fail_key_writes: true,
            ..MockGamepad::default()
        };
        let journal = device.journal();
        let mut gamepad = VirtualGamepad::new(Box::new(device));

        assert_eq!(gamepad.emit("BTN_A", 1), EmitOutcome::WriteFailed);
        assert!(journal.is_empty());
    }
}
