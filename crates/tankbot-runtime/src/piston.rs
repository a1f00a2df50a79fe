//! [`Piston`] – two-position pneumatic mechanism (climb stands, hatch
//! intake, hatch release).
//!
//! Unlike the [`Arm`][crate::arm::Arm] there is no "off": the cylinder is
//! always either released or engaged.  The same no-redundant-actuation rule
//! applies.  The state starts unknown, so the very first command is always
//! sent.

use tankbot_hal::DoubleSolenoid;
use tankbot_types::{ActuationError, SolenoidValue};
use tracing::debug;

/// Position of a two-state cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PistonState {
    /// Resting position (valve forward).
    Released,
    /// Actuated position (valve reverse).
    Engaged,
}

impl PistonState {
    /// Valve command that holds this position.
    pub fn solenoid_value(self) -> SolenoidValue {
        match self {
            Self::Released => SolenoidValue::Forward,
            Self::Engaged => SolenoidValue::Reverse,
        }
    }

    /// `Engaged` while `condition` holds, otherwise `Released`.
    pub fn engaged_if(condition: bool) -> Self {
        if condition {
            Self::Engaged
        } else {
            Self::Released
        }
    }
}

/// A double-acting cylinder that only commands its valve when the target
/// position changes.
pub struct Piston {
    solenoid: Box<dyn DoubleSolenoid>,
    state: Option<PistonState>,
}

impl Piston {
    /// Wrap `solenoid`.  The position is unknown until the first
    /// [`set`][Self::set].
    pub fn new(solenoid: Box<dyn DoubleSolenoid>) -> Self {
        Self {
            solenoid,
            state: None,
        }
    }

    /// Last state the driver accepted, `None` before the first command.
    pub fn state(&self) -> Option<PistonState> {
        self.state
    }

    /// Drive the cylinder to `target`, returning whether a valve command
    /// was actually sent.
    ///
    /// # Errors
    ///
    /// Propagates the solenoid driver's [`ActuationError`]; the tracked
    /// state is left unchanged so the next call retries.
    pub fn set(&mut self, target: PistonState) -> Result<bool, ActuationError> {
        if self.state == Some(target) {
            return Ok(false);
        }
        self.solenoid.set(target.solenoid_value())?;
        debug!(piston = %self.solenoid.id(), ?target, "piston switched");
        self.state = Some(target);
        Ok(true)
    }
}
