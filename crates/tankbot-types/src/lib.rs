//! `tankbot-types` – plain data shared by every tankbot layer.
//!
//! - [`input`] – per-tick operator samples ([`InputSnapshot`],
//!   [`GamepadState`]) and the raw gamepad channel maps.
//! - [`vision`] – detection results from the camera pipeline and the
//!   [`VisionEstimate`] derived from them.
//!
//! The error type [`ActuationError`] and the double-solenoid command
//! [`SolenoidValue`] live at the crate root.

pub mod input;
pub mod vision;

pub use input::{Axis, Button, GamepadState, InputSnapshot, sanitize_axis};
pub use vision::{DetectionResult, Region, VisionEstimate};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Command accepted by a double-acting pneumatic solenoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolenoidValue {
    /// Both valves closed; the cylinder holds whatever pressure it has.
    Off,
    Forward,
    Reverse,
}

/// Failure reported by an external driver when a command cannot be applied.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActuationError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Command {value} rejected by {component}: outside [-1, 1]")]
    OutOfRange { component: String, value: f64 },

    #[error("Input device {device} unavailable: {details}")]
    InputUnavailable { device: String, details: String },
}

impl ActuationError {
    /// Shorthand for [`ActuationError::HardwareFault`].
    pub fn fault(component: impl Into<String>, details: impl Into<String>) -> Self {
        Self::HardwareFault {
            component: component.into(),
            details: details.into(),
        }
    }

    /// Identifier of the component that reported the failure.
    pub fn component(&self) -> &str {
        match self {
            Self::HardwareFault { component, .. } | Self::OutOfRange { component, .. } => {
                component
            }
            Self::InputUnavailable { device, .. } => device,
        }
    }
}
