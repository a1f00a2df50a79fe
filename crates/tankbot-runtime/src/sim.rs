//! [`SimRobot`] – a complete simulated robot for tests and headless runs.
//!
//! Holds one probe handle per driver and hands out a [`RobotHardware`]
//! bundle built from clones of those probes, so a test can drive the pads,
//! run ticks, and then assert on exactly what each mechanism received.
//!
//! # Example
//!
//! ```rust
//! use tankbot_runtime::{ControlConfig, ControlLoop, RobotContext};
//! use tankbot_runtime::sim::SimRobot;
//!
//! let sim = SimRobot::new();
//! let ctx = RobotContext::new(true);
//! let mut control = ControlLoop::new(ControlConfig::default(), sim.hardware(), &ctx);
//!
//! sim.operator.update(|pad| pad.y = true);
//! control.tick();
//! assert!((sim.intake.speed() - 0.5).abs() < f64::EPSILON);
//! ```

use tankbot_hal::{MotorGroup, SpeedController};
use tankbot_hal::sim::{SimCamera, SimCompressor, SimDashboard, SimGamepad, SimMotor, SimSolenoid};

use crate::control_loop::RobotHardware;

/// Probe handles for every simulated driver on the robot.
#[derive(Clone)]
pub struct SimRobot {
    pub driver: SimGamepad,
    pub operator: SimGamepad,
    pub left_front: SimMotor,
    pub left_rear: SimMotor,
    pub right_front: SimMotor,
    pub right_rear: SimMotor,
    pub belt: SimMotor,
    pub intake: SimMotor,
    pub arm: SimSolenoid,
    pub front_climb: SimSolenoid,
    pub back_climb: SimSolenoid,
    pub hatch_intake: SimSolenoid,
    pub hatch_release: SimSolenoid,
    pub compressor: SimCompressor,
    pub dashboard: SimDashboard,
    pub camera: SimCamera,
}

impl Default for SimRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRobot {
    /// Fresh robot: pads neutral, motors stopped, valves closed.
    pub fn new() -> Self {
        Self {
            driver: SimGamepad::new("driver_pad"),
            operator: SimGamepad::new("operator_pad"),
            left_front: SimMotor::new("left_front"),
            left_rear: SimMotor::new("left_rear"),
            right_front: SimMotor::new("right_front"),
            right_rear: SimMotor::new("right_rear"),
            belt: SimMotor::new("belt"),
            intake: SimMotor::new("intake"),
            arm: SimSolenoid::new("intake_arm"),
            front_climb: SimSolenoid::new("front_climb_stand"),
            back_climb: SimSolenoid::new("back_climb_stand"),
            hatch_intake: SimSolenoid::new("hatch_intake"),
            hatch_release: SimSolenoid::new("hatch_release"),
            compressor: SimCompressor::new(),
            dashboard: SimDashboard::new(),
            camera: SimCamera::new("front_usb"),
        }
    }

    /// Driver bundle for [`ControlLoop::new`][crate::ControlLoop::new].  Each
    /// drivetrain side is a two-motor [`MotorGroup`].
    pub fn hardware(&self) -> RobotHardware {
        RobotHardware {
            driver_pad: Box::new(self.driver.clone()),
            operator_pad: Box::new(self.operator.clone()),
            left_drive: Box::new(MotorGroup::new(
                "left_drive",
                vec![
                    Box::new(self.left_front.clone()) as Box<dyn SpeedController>,
                    Box::new(self.left_rear.clone()),
                ],
            )),
            right_drive: Box::new(MotorGroup::new(
                "right_drive",
                vec![
                    Box::new(self.right_front.clone()) as Box<dyn SpeedController>,
                    Box::new(self.right_rear.clone()),
                ],
            )),
            belt: Box::new(self.belt.clone()),
            intake: Box::new(self.intake.clone()),
            arm_solenoid: Box::new(self.arm.clone()),
            front_climb: Box::new(self.front_climb.clone()),
            back_climb: Box::new(self.back_climb.clone()),
            hatch_intake: Box::new(self.hatch_intake.clone()),
            hatch_release: Box::new(self.hatch_release.clone()),
            compressor: Box::new(self.compressor.clone()),
            dashboard: Box::new(self.dashboard.clone()),
        }
    }

    /// Camera handle for [`Guidance::new`][crate::Guidance::new].
    pub fn camera(&self) -> Box<SimCamera> {
        Box::new(self.camera.clone())
    }
}
