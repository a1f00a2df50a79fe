//! [`ControlLoop`] – the fixed-period teleoperation orchestrator.
//!
//! Each call to [`ControlLoop::tick`] runs, in this order:
//!
//! 1. **Input** – poll both gamepads.  A device that fails to report is
//!    replaced by a neutral pad for this tick.
//! 2. **Drive scale** – slow (left bumper) beats boost (right bumper), else
//!    nominal; the sign carries over from the previous tick.
//! 3. **Inversion** – advance the edge latch on the driver's A button if the
//!    dashboard's `InverseEnabled` flag is set.
//! 4. **Drive** – tank-drive commands from both stick Y axes.
//! 5. **Climb stands** – front from the right trigger, back from the left.
//! 6. **Belt** – operator left stick Y, boosted by the operator left trigger.
//! 7. **Hatch** – intake closes on A or B, release pistons fire on B.
//! 8. **Arm** – X raises, Y lowers, both or neither turns the arm off; the
//!    intake roller follows the arm position.
//! 9. **Telemetry** – publish drive power, belt speed, inversion, arm and
//!    vision values.
//!
//! # Fault isolation
//!
//! Every actuator step is its own fault domain.  A failing driver is logged
//! with its [`Subsystem`] and recorded in the [`TickReport`]; the remaining
//! steps still run in the same tick.  Nothing is retried within a tick; the
//! next tick re-issues whatever the input still asks for.

use tankbot_hal::{Compressor, DoubleSolenoid, Gamepad, SpeedController, TelemetrySink};
use tankbot_types::{ActuationError, GamepadState, InputSnapshot, VisionEstimate};
use tracing::{debug, info, warn};

use crate::arm::{Arm, ArmPosition};
use crate::context::RobotContext;
use crate::drive::{DriveScales, DriveState};
use crate::piston::{Piston, PistonState};
use crate::vision::SharedVision;

// ─────────────────────────────────────────────────────────────────────────────
// Telemetry keys
// ─────────────────────────────────────────────────────────────────────────────

/// Dashboard keys written (and, for `INVERSE_ENABLED`, read) by the loop.
pub mod keys {
    pub const LEFT_WHEEL_POWER: &str = "Left Wheel Power";
    pub const RIGHT_WHEEL_POWER: &str = "Right Wheel Power";
    pub const BELT_SPEED: &str = "Belt Speed";
    pub const IS_DRIVE_INVERTED: &str = "isDriveInverted";
    pub const INVERSE_ENABLED: &str = "InverseEnabled";
    pub const ARM_POSITION: &str = "Arm Position";
    pub const CENTER_X: &str = "Center X";
    pub const CENTER_Y: &str = "Center Y";
    pub const AREA: &str = "Area";
    pub const HAS_TARGET: &str = "Has Target";
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tuning constants for [`ControlLoop`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlConfig {
    /// Intake roller speed while the arm is down.
    pub intake_speed: f64,
    pub drive: DriveScales,
    /// Belt multiplier without boost.
    pub belt_nominal: f64,
    /// Belt multiplier while the boost trigger is held.
    pub belt_boost: f64,
    /// Trigger travel beyond which a trigger counts as pressed.
    pub trigger_threshold: f64,
    /// Initial value of the dashboard's `InverseEnabled` flag.
    pub inversion_enabled: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            intake_speed: 0.5,
            drive: DriveScales::default(),
            belt_nominal: 0.65,
            belt_boost: 1.0,
            trigger_threshold: 0.2,
            inversion_enabled: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hardware bundle
// ─────────────────────────────────────────────────────────────────────────────

/// Every driver the control loop takes ownership of.
pub struct RobotHardware {
    pub driver_pad: Box<dyn Gamepad>,
    pub operator_pad: Box<dyn Gamepad>,
    pub left_drive: Box<dyn SpeedController>,
    pub right_drive: Box<dyn SpeedController>,
    pub belt: Box<dyn SpeedController>,
    pub intake: Box<dyn SpeedController>,
    pub arm_solenoid: Box<dyn DoubleSolenoid>,
    pub front_climb: Box<dyn DoubleSolenoid>,
    pub back_climb: Box<dyn DoubleSolenoid>,
    pub hatch_intake: Box<dyn DoubleSolenoid>,
    pub hatch_release: Box<dyn DoubleSolenoid>,
    pub compressor: Box<dyn Compressor>,
    pub dashboard: Box<dyn TelemetrySink>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tick report
// ─────────────────────────────────────────────────────────────────────────────

/// Independent fault domains within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Input,
    Drive,
    FrontClimb,
    BackClimb,
    Belt,
    Hatch,
    Arm,
}

/// Values computed during one tick, whether or not the driver accepted them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutputs {
    pub drive_scale: f64,
    pub left_drive: f64,
    pub right_drive: f64,
    pub drive_reversed: bool,
    pub front_climb: Option<PistonState>,
    pub back_climb: Option<PistonState>,
    pub belt: f64,
    pub hatch_intake: Option<PistonState>,
    pub hatch_release: Option<PistonState>,
    pub arm_target: ArmPosition,
    pub intake: f64,
    pub vision: VisionEstimate,
}

/// Outcome of one [`ControlLoop::tick`].
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub outputs: TickOutputs,
    pub faults: Vec<(Subsystem, ActuationError)>,
}

impl TickReport {
    /// `true` if every subsystem succeeded this tick.
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    /// `true` if `subsystem` failed this tick.
    pub fn faulted(&self, subsystem: Subsystem) -> bool {
        self.faults.iter().any(|(s, _)| *s == subsystem)
    }

    fn record(&mut self, subsystem: Subsystem, result: Result<(), ActuationError>) {
        if let Err(e) = result {
            warn!(?subsystem, component = %e.component(), error = %e, "subsystem fault");
            self.faults.push((subsystem, e));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ControlLoop
// ─────────────────────────────────────────────────────────────────────────────

/// The teleoperation loop.  Owns every mechanism; shares only the vision
/// estimate with the guidance task.
pub struct ControlLoop {
    config: ControlConfig,
    driver_pad: Box<dyn Gamepad>,
    operator_pad: Box<dyn Gamepad>,
    left_drive: Box<dyn SpeedController>,
    right_drive: Box<dyn SpeedController>,
    belt: Box<dyn SpeedController>,
    front_climb: Piston,
    back_climb: Piston,
    hatch_intake: Piston,
    hatch_release: Piston,
    arm: Arm,
    compressor: Box<dyn Compressor>,
    dashboard: Box<dyn TelemetrySink>,
    drive: DriveState,
    vision: SharedVision,
}

impl ControlLoop {
    /// Take ownership of `hardware`, start the compressor and publish the
    /// initial `InverseEnabled` flag.
    ///
    /// A compressor that fails to start is logged; the loop still runs.
    pub fn new(config: ControlConfig, hardware: RobotHardware, ctx: &RobotContext) -> Self {
        let RobotHardware {
            driver_pad,
            operator_pad,
            left_drive,
            right_drive,
            belt,
            intake,
            arm_solenoid,
            front_climb,
            back_climb,
            hatch_intake,
            hatch_release,
            mut compressor,
            mut dashboard,
        } = hardware;

        if let Err(e) = compressor.start() {
            warn!(error = %e, "compressor failed to start; pneumatics may be unpowered");
        }
        dashboard.put_boolean(keys::INVERSE_ENABLED, config.inversion_enabled);
        info!(
            intake_speed = config.intake_speed,
            inversion_enabled = config.inversion_enabled,
            "control loop initialised"
        );

        Self {
            config,
            driver_pad,
            operator_pad,
            left_drive,
            right_drive,
            belt,
            front_climb: Piston::new(front_climb),
            back_climb: Piston::new(back_climb),
            hatch_intake: Piston::new(hatch_intake),
            hatch_release: Piston::new(hatch_release),
            arm: Arm::new(arm_solenoid, intake),
            compressor,
            dashboard,
            drive: DriveState::new(config.drive.nominal),
            vision: ctx.vision.clone(),
        }
    }

    pub fn drive_state(&self) -> &DriveState {
        &self.drive
    }

    /// Position the arm currently holds.
    pub fn arm_position(&self) -> ArmPosition {
        self.arm.position()
    }

    /// `true` once the compressor has started.
    pub fn compressor_running(&self) -> bool {
        self.compressor.is_running()
    }

    /// Run one control period.  Never fails: faults are collected in the
    /// returned report.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        // 1. Input
        let input = self.capture_input(&mut report);
        let driver = input.driver;
        let operator = input.operator;
        report.outputs.vision = self.vision.snapshot();

        // 2. Drive scale
        self.drive
            .select_scale(driver.left_bumper, driver.right_bumper, &self.config.drive);

        // 3. Inversion
        let enabled = self
            .dashboard
            .get_boolean(keys::INVERSE_ENABLED, self.config.inversion_enabled);
        if self.drive.update_inversion(driver.a, enabled) {
            debug!(reversed = self.drive.is_reversed(), "drive direction flipped");
        }
        report.outputs.drive_scale = self.drive.scale();
        report.outputs.drive_reversed = self.drive.is_reversed();

        // 4. Drive
        let result = self.run_drive(&driver, &mut report.outputs);
        report.record(Subsystem::Drive, result);

        // 5. Climb stands
        let threshold = self.config.trigger_threshold;
        let front = PistonState::engaged_if(driver.right_trigger > threshold);
        report.outputs.front_climb = Some(front);
        let result = self.front_climb.set(front).map(|_| ());
        report.record(Subsystem::FrontClimb, result);

        let back = PistonState::engaged_if(driver.left_trigger > threshold);
        report.outputs.back_climb = Some(back);
        let result = self.back_climb.set(back).map(|_| ());
        report.record(Subsystem::BackClimb, result);

        // 6. Belt
        let result = self.run_belt(&operator, &mut report.outputs);
        report.record(Subsystem::Belt, result);

        // 7. Hatch
        let result = self.run_hatch(&operator, &mut report.outputs);
        report.record(Subsystem::Hatch, result);

        // 8. Arm
        let result = self.run_arm(&operator, &mut report.outputs);
        report.record(Subsystem::Arm, result);

        // 9. Telemetry
        self.publish(&report.outputs);

        report
    }

    fn capture_input(&mut self, report: &mut TickReport) -> InputSnapshot {
        let driver = Self::poll_or_neutral(self.driver_pad.as_mut(), report);
        let operator = Self::poll_or_neutral(self.operator_pad.as_mut(), report);
        InputSnapshot { driver, operator }
    }

    fn poll_or_neutral(pad: &mut dyn Gamepad, report: &mut TickReport) -> GamepadState {
        match pad.poll() {
            Ok(state) => state.sanitized(),
            Err(e) => {
                report.record(Subsystem::Input, Err(e));
                GamepadState::default()
            }
        }
    }

    fn run_drive(
        &mut self,
        driver: &GamepadState,
        outputs: &mut TickOutputs,
    ) -> Result<(), ActuationError> {
        let (left, right) = self.drive.tank_commands(driver.left_y, driver.right_y);
        outputs.left_drive = left;
        outputs.right_drive = right;
        let left_result = self.left_drive.set_speed(left);
        let right_result = self.right_drive.set_speed(right);
        left_result.and(right_result)
    }

    fn run_belt(
        &mut self,
        operator: &GamepadState,
        outputs: &mut TickOutputs,
    ) -> Result<(), ActuationError> {
        let multiplier = if operator.left_trigger > self.config.trigger_threshold {
            self.config.belt_boost
        } else {
            self.config.belt_nominal
        };
        let speed = (-operator.left_y * multiplier).clamp(-1.0, 1.0);
        outputs.belt = speed;
        self.belt.set_speed(speed)
    }

    fn run_hatch(
        &mut self,
        operator: &GamepadState,
        outputs: &mut TickOutputs,
    ) -> Result<(), ActuationError> {
        let intake = PistonState::engaged_if(operator.a || operator.b);
        let release = PistonState::engaged_if(operator.b);
        outputs.hatch_intake = Some(intake);
        outputs.hatch_release = Some(release);
        let intake_result = self.hatch_intake.set(intake).map(|_| ());
        let release_result = self.hatch_release.set(release).map(|_| ());
        intake_result.and(release_result)
    }

    fn run_arm(
        &mut self,
        operator: &GamepadState,
        outputs: &mut TickOutputs,
    ) -> Result<(), ActuationError> {
        let target = ArmPosition::from_buttons(operator.x, operator.y);
        outputs.arm_target = target;
        let moved = self.arm.set_position(target);
        // The roller follows whatever position the arm actually holds.
        outputs.intake = self.arm.motor_command(self.config.intake_speed);
        let spun = self.arm.run_motor(self.config.intake_speed).map(|_| ());
        moved.and(spun)
    }

    fn publish(&mut self, outputs: &TickOutputs) {
        let dash = self.dashboard.as_mut();
        dash.put_number(keys::LEFT_WHEEL_POWER, outputs.left_drive);
        dash.put_number(keys::RIGHT_WHEEL_POWER, outputs.right_drive);
        dash.put_number(keys::BELT_SPEED, outputs.belt);
        dash.put_boolean(keys::IS_DRIVE_INVERTED, outputs.drive_reversed);
        dash.put_number(keys::ARM_POSITION, self.arm.position().telemetry_code());
        dash.put_number(keys::CENTER_X, outputs.vision.center_x);
        dash.put_number(keys::CENTER_Y, outputs.vision.center_y);
        dash.put_number(keys::AREA, outputs.vision.area);
        dash.put_boolean(keys::HAS_TARGET, outputs.vision.has_detection);
    }
}
