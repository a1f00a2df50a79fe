//! `SpeedController` capability trait and the [`MotorGroup`] combinator.
//!
//! Anything that accepts a scalar speed command (PWM motor controllers,
//! CAN motor controllers, groups of either) implements
//! [`SpeedController`].  The control loop accepts any implementor at
//! construction, so no runtime type checks are needed to find out whether
//! a driver can be driven by speed.

use tankbot_types::ActuationError;

/// A motor (or motor group) driven by a bounded speed command.
pub trait SpeedController: Send + Sync {
    /// Stable identifier, e.g. `"belt"` or `"left_drive"`.
    fn id(&self) -> &str;

    /// Command the output to `speed`, a duty cycle in `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError::HardwareFault`] if the driver cannot apply
    /// the command and [`ActuationError::OutOfRange`] if `speed` is not a
    /// finite value in `[-1, 1]`.
    fn set_speed(&mut self, speed: f64) -> Result<(), ActuationError>;

    /// Most recently applied speed command.
    fn speed(&self) -> f64;
}

/// Reject commands that a motor driver cannot represent.
pub fn check_speed(component: &str, speed: f64) -> Result<(), ActuationError> {
    if speed.is_finite() && (-1.0..=1.0).contains(&speed) {
        Ok(())
    } else {
        Err(ActuationError::OutOfRange {
            component: component.to_string(),
            value: speed,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MotorGroup
// ────────────────────────────────────────────────────────────────────────────

/// Several controllers mechanically coupled to one output (e.g. the two
/// motors of one drivetrain side), driven with a single command.
pub struct MotorGroup {
    id: String,
    members: Vec<Box<dyn SpeedController>>,
    speed: f64,
}

impl MotorGroup {
    /// Group `members` under one identifier.  Every member receives the same
    /// command.
    pub fn new(id: impl Into<String>, members: Vec<Box<dyn SpeedController>>) -> Self {
        Self {
            id: id.into(),
            members,
            speed: 0.0,
        }
    }

    /// Number of member controllers.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// `true` if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl SpeedController for MotorGroup {
    fn id(&self) -> &str {
        &self.id
    }

    /// Every member is commanded even if an earlier one fails; the first
    /// failure is returned.
    fn set_speed(&mut self, speed: f64) -> Result<(), ActuationError> {
        check_speed(&self.id, speed)?;
        let mut first_err = None;
        for member in &mut self.members {
            if let Err(e) = member.set_speed(speed) {
                first_err.get_or_insert(e);
            }
        }
        self.speed = speed;
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn speed(&self) -> f64 {
        self.speed
    }
}
