//! Virtual gamepad backends.
//!
//! The correct implementation is selected at compile time via `#[cfg(target_os = ...)]`.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

use crate::application::emit_buttons::{DeviceError, GamepadDevice};

/// Creates the gamepad for the current platform, declaring every button of
/// [`padcast_core::GAMEPAD_BUTTONS`].
///
/// # Errors
///
/// Returns [`DeviceError`] if the device cannot be created.  This is fatal
/// for the process and is not retried.
pub fn create_platform_gamepad() -> Result<Box<dyn GamepadDevice>, DeviceError> {
    #[cfg(target_os = "linux")]
    {
        let device = linux::UinputGamepad::create(&padcast_core::GAMEPAD_BUTTONS)?;
        Ok(Box::new(device))
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(DeviceError::Unsupported)
    }
}
