//! Linux virtual gamepad via uinput.
//!
//! # What is uinput? (for beginners)
//!
//! `/dev/uinput` is a kernel facility that lets a user-space process create an
//! input device.  Once registered, the device shows up under
//! `/dev/input/event*` like real hardware, and games read it through evdev or
//! SDL without knowing it is virtual.
//!
//! Registration declares, up front, every key code the device can send.  The
//! device then receives `input_event` records; a report is only delivered to
//! readers after an `EV_SYN / SYN_REPORT` record.
//!
//! The device identifies itself as a wired Xbox 360 controller (USB,
//! vendor `0x045e`, product `0x028e`) so that games and SDL pick a sensible
//! default button layout.
//!
//! # Permissions
//!
//! Opening `/dev/uinput` usually requires root or a udev rule granting the
//! user write access.  The `uinput` kernel module must be loaded.

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, BusType, EventType, InputEvent, InputId, Key,
};
use padcast_core::ButtonTable;
use tracing::{debug, info};

use crate::application::emit_buttons::{DeviceError, GamepadDevice};

/// Name the device registers with.
pub const DEVICE_NAME: &str = "Virtual Microsoft X-Box 360 Controller";

const VENDOR_MICROSOFT: u16 = 0x045e;
const PRODUCT_XBOX_360: u16 = 0x028e;
const DEVICE_VERSION: u16 = 1;

/// A registered uinput gamepad.  Destroyed when dropped.
pub struct UinputGamepad {
    device: VirtualDevice,
    /// Key records waiting for the next sync.  Never holds a sync record.
    pending: Vec<InputEvent>,
}

impl UinputGamepad {
    /// Opens uinput and registers a gamepad supporting every button in `buttons`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Unavailable`] if `/dev/uinput` cannot be opened
    /// and [`DeviceError::Register`] if the kernel rejects the device.
    pub fn create(buttons: &ButtonTable) -> Result<Self, DeviceError> {
        let mut keys = AttributeSet::<Key>::new();
        for entry in buttons.entries() {
            keys.insert(Key::new(entry.code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(DeviceError::Unavailable)?
            .name(DEVICE_NAME)
            .input_id(InputId::new(
                BusType::BUS_USB,
                VENDOR_MICROSOFT,
                PRODUCT_XBOX_360,
                DEVICE_VERSION,
            ))
            .with_keys(&keys)
            .map_err(DeviceError::Register)?
            .build()
            .map_err(DeviceError::Register)?;

        info!("created virtual gamepad '{DEVICE_NAME}' with {} buttons", buttons.len());
        Ok(Self {
            device,
            pending: Vec::new(),
        })
    }
}

/// The record for one key state change.
fn key_record(code: u16, state: i32) -> InputEvent {
    InputEvent::new(EventType::KEY, code, state)
}

/// Takes the buffered key records for one report.
///
/// `VirtualDevice::emit` writes these and then appends exactly one
/// `SYN_REPORT` of its own, so the report must not carry a sync record.
fn take_report(pending: &mut Vec<InputEvent>) -> Vec<InputEvent> {
    std::mem::take(pending)
}

impl GamepadDevice for UinputGamepad {
    /// Only buffers the record; nothing reaches the device until
    /// [`write_sync`](GamepadDevice::write_sync), so this never fails.
    fn write_key(&mut self, code: u16, state: i32) -> Result<(), DeviceError> {
        self.pending.push(key_record(code, state));
        Ok(())
    }

    /// Writes the buffered key records followed by one `SYN_REPORT`.
    ///
    /// A failure here drops the whole report, key record included.
    fn write_sync(&mut self) -> Result<(), DeviceError> {
        let report = take_report(&mut self.pending);
        self.device.emit(&report).map_err(DeviceError::Write)
    }
}

impl Drop for UinputGamepad {
    fn drop(&mut self) {
        debug!("releasing uinput device");
        info!("destroyed virtual gamepad '{DEVICE_NAME}'");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_one_button_is_a_single_key_record() {
        // Arrange
        let mut pending = vec![key_record(0x130, 1)];

        // Act
        let report = take_report(&mut pending);

        // Assert: evdev appends the one sync record itself.
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].event_type(), EventType::KEY);
        assert_eq!(report[0].code(), 0x130);
        assert_eq!(report[0].value(), 1);
        assert!(report
            .iter()
            .all(|record| record.event_type() != EventType::SYNCHRONIZATION));
    }

    #[test]
    fn test_taking_a_report_empties_the_buffer() {
        let mut pending = vec![key_record(0x131, 0)];

        let first = take_report(&mut pending);
        let second = take_report(&mut pending);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(pending.is_empty());
    }
}
