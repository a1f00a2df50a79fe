//! `tankbot-hal` – hardware capability traits.
//!
//! Every external collaborator the control core talks to is reached through
//! one of these traits, so drivers can be swapped without touching control
//! logic.
//!
//! # Modules
//!
//! - [`motor`] – [`SpeedController`][motor::SpeedController] and
//!   [`MotorGroup`][motor::MotorGroup].
//! - [`pneumatics`] – [`DoubleSolenoid`][pneumatics::DoubleSolenoid] and
//!   [`Compressor`][pneumatics::Compressor].
//! - [`camera`] – [`Camera`][camera::Camera] configuration.
//! - [`gamepad`] – [`Gamepad`][gamepad::Gamepad] input polling.
//! - [`dashboard`] – [`TelemetrySink`][dashboard::TelemetrySink].
//! - [`sim`] – recording drivers for tests and headless runs.

pub mod camera;
pub mod dashboard;
pub mod gamepad;
pub mod motor;
pub mod pneumatics;
pub mod sim;

pub use camera::{Camera, CaptureSettings, ExposureProfile};
pub use dashboard::TelemetrySink;
pub use gamepad::Gamepad;
pub use motor::{MotorGroup, SpeedController};
pub use pneumatics::{Compressor, DoubleSolenoid};
