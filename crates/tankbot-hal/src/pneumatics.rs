//! Pneumatic capability traits: double-acting solenoids and the compressor
//! that feeds them.

use tankbot_types::{ActuationError, SolenoidValue};

/// A double-acting solenoid valve driving one pneumatic cylinder.
pub trait DoubleSolenoid: Send + Sync {
    /// Stable identifier, e.g. `"front_climb_stand"`.
    fn id(&self) -> &str;

    /// Switch the valve to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError::HardwareFault`] if the pneumatics module
    /// rejects the command (e.g. a shorted channel).
    fn set(&mut self, value: SolenoidValue) -> Result<(), ActuationError>;

    /// Most recently applied valve state.
    fn get(&self) -> SolenoidValue;
}

/// The air compressor feeding every solenoid.
pub trait Compressor: Send + Sync {
    /// Enable closed-loop pressure control.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError::HardwareFault`] if the compressor cannot be
    /// enabled.
    fn start(&mut self) -> Result<(), ActuationError>;

    fn is_running(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockSolenoid {
        value: SolenoidValue,
    }

    impl DoubleSolenoid for MockSolenoid {
        fn id(&self) -> &str {
            "mock"
        }

        fn set(&mut self, value: SolenoidValue) -> Result<(), ActuationError> {
            self.value = value;
            Ok(())
        }

        fn get(&self) -> SolenoidValue {
            self.value
        }
    }

    #[test]
    fn mock_solenoid_tracks_value() {
        let mut sol = MockSolenoid {
            value: SolenoidValue::Off,
        };
        sol.set(SolenoidValue::Reverse).unwrap();
        assert_eq!(sol.get(), SolenoidValue::Reverse);
        assert_eq!(sol.id(), "mock");
    }
}
