//! `tankbot-runtime` – the robot's teleoperation brain.
//!
//! Two concurrent activities run for the life of the process and share
//! nothing but a [`RobotContext`]:
//!
//! - the **control loop**, ticked at a fixed period by [`runner::run`], which
//!   turns two gamepads into drive, climb, belt, hatch and arm commands; and
//! - the **guidance task**, fed by the camera pipeline, which publishes the
//!   latest target estimate for the control loop to display.
//!
//! # Modules
//!
//! - [`control_loop`] – [`ControlLoop`]: one tick of input, mechanism
//!   updates and dashboard telemetry, with per-subsystem fault isolation.
//! - [`drive`] – [`DriveState`]: speed-scale selection, the reversal latch
//!   and tank-drive mixing.
//! - [`arm`] – [`Arm`]: the three-position intake arm and its roller.
//! - [`piston`] – [`Piston`]: two-position pneumatic mechanisms.
//! - [`guidance`] – [`Guidance`]: camera exposure control and target
//!   estimation from pipeline frames.
//! - [`vision`] – [`SharedVision`]: the single-record hand-off between
//!   guidance and the control loop.
//! - [`context`] – [`RobotContext`]: shared flags built once at startup.
//! - [`runner`] – the fixed-period `tokio` driver and its [`TickStats`].
//! - [`logging`] – [`init_logging`][logging::init_logging].
//! - [`sim`] – [`SimRobot`][sim::SimRobot]: a fully simulated robot for tests
//!   and headless runs.

pub mod arm;
pub mod context;
pub mod control_loop;
pub mod drive;
pub mod guidance;
pub mod logging;
pub mod piston;
pub mod runner;
pub mod sim;
pub mod vision;

pub use arm::{Arm, ArmPosition};
pub use context::RobotContext;
pub use control_loop::{
    ControlConfig, ControlLoop, RobotHardware, Subsystem, TickOutputs, TickReport, keys,
};
pub use drive::{DriveScales, DriveState, LatchState};
pub use guidance::{Guidance, GuidanceConfig};
pub use logging::init_logging;
pub use piston::{Piston, PistonState};
pub use runner::{TickStats, run};
pub use vision::SharedVision;
