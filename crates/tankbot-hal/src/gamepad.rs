//! `Gamepad` capability trait for operator input devices.

use tankbot_types::{ActuationError, GamepadState};

/// An operator input device, polled once per control tick.
pub trait Gamepad: Send + Sync {
    /// Stable identifier, e.g. `"driver_pad"`.
    fn id(&self) -> &str;

    /// Sample every axis and button.  Must not block beyond reading the
    /// latest report already received from the device.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError::InputUnavailable`] when the device is
    /// disconnected or has not reported yet.
    fn poll(&mut self) -> Result<GamepadState, ActuationError>;
}
