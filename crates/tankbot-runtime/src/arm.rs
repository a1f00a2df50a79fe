//! [`Arm`] – the intake arm state machine.
//!
//! The arm couples a double-acting pneumatic cylinder (raising and lowering
//! the arm) with an intake roller motor.  Its position is one of
//! [`ArmPosition::Up`], [`ArmPosition::Down`] or [`ArmPosition::Off`]
//! (valves closed), and the roller speed is a fixed function of that
//! position.
//!
//! # No redundant actuation
//!
//! A valve command is sent only when the requested position differs from
//! the tracked one, so holding a button for many ticks produces exactly one
//! solenoid switch.  `Off` is a fully tracked position: a second `Off` in a
//! row is a no-op like any other repeat.
//!
//! # Example
//!
//! ```rust
//! use tankbot_hal::sim::{SimMotor, SimSolenoid};
//! use tankbot_runtime::arm::{Arm, ArmPosition};
//!
//! let valve = SimSolenoid::new("arm");
//! let mut arm = Arm::new(Box::new(valve.clone()), Box::new(SimMotor::new("intake")));
//!
//! arm.set_position(ArmPosition::Down).unwrap();
//! arm.set_position(ArmPosition::Down).unwrap();
//! assert_eq!(valve.actuation_count(), 1);
//! assert_eq!(arm.motor_command(0.5), 0.5);
//! ```

use tankbot_hal::{DoubleSolenoid, SpeedController};
use tankbot_types::{ActuationError, SolenoidValue};
use tracing::debug;

/// Discrete arm position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArmPosition {
    /// Arm raised; intake stopped.
    Up,
    /// Arm lowered; intake running.
    Down,
    /// Valves closed; intake stopped.
    #[default]
    Off,
}

impl ArmPosition {
    /// Valve command that realises this position.
    pub fn solenoid_value(self) -> SolenoidValue {
        match self {
            Self::Up => SolenoidValue::Forward,
            Self::Down => SolenoidValue::Reverse,
            Self::Off => SolenoidValue::Off,
        }
    }

    /// Numeric code published to the dashboard.
    pub fn telemetry_code(self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
            Self::Off => 0.0,
        }
    }

    /// Resolve two opposing buttons: exactly one pressed selects its
    /// position, neither or both selects `Off`.
    pub fn from_buttons(up: bool, down: bool) -> Self {
        match (up, down) {
            (true, false) => Self::Up,
            (false, true) => Self::Down,
            _ => Self::Off,
        }
    }
}

/// Intake arm: pneumatic position plus roller motor.
pub struct Arm {
    solenoid: Box<dyn DoubleSolenoid>,
    intake: Box<dyn SpeedController>,
    position: ArmPosition,
}

impl Arm {
    /// Build an arm in the `Off` position.
    ///
    /// Double solenoids power up with both valves closed, so no command is
    /// sent here.
    pub fn new(solenoid: Box<dyn DoubleSolenoid>, intake: Box<dyn SpeedController>) -> Self {
        Self {
            solenoid,
            intake,
            position: ArmPosition::Off,
        }
    }

    /// Current tracked position.
    pub fn position(&self) -> ArmPosition {
        self.position
    }

    /// Move the arm to `target`.
    ///
    /// Sends a valve command only if `target` differs from the current
    /// position.  The tracked position changes only after the driver
    /// accepted the command, so a failed switch is retried on the next call.
    ///
    /// # Errors
    ///
    /// Propagates the solenoid driver's [`ActuationError`].
    pub fn set_position(&mut self, target: ArmPosition) -> Result<(), ActuationError> {
        if target == self.position {
            return Ok(());
        }
        self.solenoid.set(target.solenoid_value())?;
        debug!(from = ?self.position, to = ?target, "arm moved");
        self.position = target;
        Ok(())
    }

    /// Roller speed for the current position: `nominal_speed` when down,
    /// `0` otherwise.
    pub fn motor_command(&self, nominal_speed: f64) -> f64 {
        match self.position {
            ArmPosition::Down => nominal_speed,
            ArmPosition::Up | ArmPosition::Off => 0.0,
        }
    }

    /// Send [`motor_command`][Self::motor_command] to the intake motor and
    /// return it.
    ///
    /// # Errors
    ///
    /// Propagates the motor driver's [`ActuationError`].
    pub fn run_motor(&mut self, nominal_speed: f64) -> Result<f64, ActuationError> {
        let command = self.motor_command(nominal_speed);
        self.intake.set_speed(command)?;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankbot_hal::sim::{SimMotor, SimSolenoid};

    fn arm() -> (Arm, SimSolenoid, SimMotor) {
        let valve = SimSolenoid::new("arm");
        let motor = SimMotor::new("intake");
        let arm = Arm::new(Box::new(valve.clone()), Box::new(motor.clone()));
        (arm, valve, motor)
    }

    #[test]
    fn starts_off_without_actuating() {
        let (arm, valve, _) = arm();
        assert_eq!(arm.position(), ArmPosition::Off);
        assert_eq!(valve.actuation_count(), 0);
    }

    #[test]
    fn repeated_target_actuates_once() {
        let (mut arm, valve, _) = arm();
        for _ in 0..5 {
            arm.set_position(ArmPosition::Up).unwrap();
        }
        assert_eq!(valve.history(), vec![SolenoidValue::Forward]);
    }

    #[test]
    fn off_is_tracked_like_any_other_position() {
        let (mut arm, valve, _) = arm();
        arm.set_position(ArmPosition::Down).unwrap();
        arm.set_position(ArmPosition::Off).unwrap();
        arm.set_position(ArmPosition::Off).unwrap();
        assert_eq!(arm.position(), ArmPosition::Off);
        assert_eq!(
            valve.history(),
            vec![SolenoidValue::Reverse, SolenoidValue::Off]
        );
    }

    #[test]
    fn every_change_actuates() {
        let (mut arm, valve, _) = arm();
        arm.set_position(ArmPosition::Up).unwrap();
        arm.set_position(ArmPosition::Down).unwrap();
        arm.set_position(ArmPosition::Up).unwrap();
        assert_eq!(valve.actuation_count(), 3);
    }

    #[test]
    fn motor_policy_per_position() {
        let (mut arm, _, _) = arm();
        assert_eq!(arm.motor_command(0.5), 0.0);
        arm.set_position(ArmPosition::Up).unwrap();
        assert_eq!(arm.motor_command(0.5), 0.0);
        arm.set_position(ArmPosition::Down).unwrap();
        assert_eq!(arm.motor_command(0.5), 0.5);
        assert_eq!(arm.motor_command(0.8), 0.8);
    }

    #[test]
    fn run_motor_sends_command() {
        let (mut arm, _, motor) = arm();
        arm.set_position(ArmPosition::Down).unwrap();
        let sent = arm.run_motor(0.5).unwrap();
        assert_eq!(sent, 0.5);
        assert!((motor.speed() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn failed_switch_keeps_position_and_retries() {
        let (mut arm, valve, _) = arm();
        valve.inject_fault("shorted channel");
        assert!(arm.set_position(ArmPosition::Up).is_err());
        assert_eq!(arm.position(), ArmPosition::Off);

        valve.clear_fault();
        arm.set_position(ArmPosition::Up).unwrap();
        assert_eq!(arm.position(), ArmPosition::Up);
        assert_eq!(valve.actuation_count(), 1);
    }

    #[test]
    fn buttons_resolve_exclusively() {
        assert_eq!(ArmPosition::from_buttons(true, false), ArmPosition::Up);
        assert_eq!(ArmPosition::from_buttons(false, true), ArmPosition::Down);
        assert_eq!(ArmPosition::from_buttons(true, true), ArmPosition::Off);
        assert_eq!(ArmPosition::from_buttons(false, false), ArmPosition::Off);
    }
}
