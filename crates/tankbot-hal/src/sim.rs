//! In-process simulated drivers for tests and headless runs.
//!
//! Every sim driver is a cheap `Clone` handle around shared state: box one
//! clone into the control loop and keep another to inspect what was
//! commanded or to inject faults.
//!
//! # Example
//!
//! ```rust
//! use tankbot_hal::motor::SpeedController;
//! use tankbot_hal::sim::SimMotor;
//!
//! let probe = SimMotor::new("belt");
//! let mut driver: Box<dyn SpeedController> = Box::new(probe.clone());
//! driver.set_speed(0.65).unwrap();
//! assert!((probe.speed() - 0.65).abs() < f64::EPSILON);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tankbot_types::{ActuationError, DetectionResult, GamepadState, Region, SolenoidValue};
use tracing::trace;

use crate::camera::{Camera, CaptureSettings};
use crate::dashboard::TelemetrySink;
use crate::gamepad::Gamepad;
use crate::motor::{SpeedController, check_speed};
use crate::pneumatics::{Compressor, DoubleSolenoid};

// ────────────────────────────────────────────────────────────────────────────
// Motor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MotorState {
    speed: f64,
    commands: usize,
    fault: Option<String>,
}

/// Simulated speed controller that records every command.
#[derive(Clone)]
pub struct SimMotor {
    id: String,
    state: Arc<Mutex<MotorState>>,
}

impl SimMotor {
    /// Create a stopped simulated motor named `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Arc::default(),
        }
    }

    /// Number of accepted commands so far.
    pub fn command_count(&self) -> usize {
        self.state.lock().commands
    }

    /// Make every subsequent command fail with `details` until
    /// [`clear_fault`][Self::clear_fault].
    pub fn inject_fault(&self, details: impl Into<String>) {
        self.state.lock().fault = Some(details.into());
    }

    /// Let commands succeed again.
    pub fn clear_fault(&self) {
        self.state.lock().fault = None;
    }

    /// Last accepted speed command.
    pub fn speed(&self) -> f64 {
        self.state.lock().speed
    }
}

impl SpeedController for SimMotor {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_speed(&mut self, speed: f64) -> Result<(), ActuationError> {
        check_speed(&self.id, speed)?;
        let mut state = self.state.lock();
        if let Some(details) = &state.fault {
            return Err(ActuationError::fault(&self.id, details.clone()));
        }
        state.speed = speed;
        state.commands += 1;
        Ok(())
    }

    fn speed(&self) -> f64 {
        SimMotor::speed(self)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Solenoid
// ────────────────────────────────────────────────────────────────────────────

struct SolenoidState {
    value: SolenoidValue,
    history: Vec<SolenoidValue>,
    fault: Option<String>,
}

/// Simulated double solenoid that records every valve command it accepts.
#[derive(Clone)]
pub struct SimSolenoid {
    id: String,
    state: Arc<Mutex<SolenoidState>>,
}

impl SimSolenoid {
    /// Create a simulated solenoid named `id`, valve closed (`Off`).
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(SolenoidState {
                value: SolenoidValue::Off,
                history: Vec::new(),
                fault: None,
            })),
        }
    }

    /// Every accepted command, oldest first.
    pub fn history(&self) -> Vec<SolenoidValue> {
        self.state.lock().history.clone()
    }

    /// Number of physical actuations performed.
    pub fn actuation_count(&self) -> usize {
        self.state.lock().history.len()
    }

    /// Current valve position.
    pub fn value(&self) -> SolenoidValue {
        self.state.lock().value
    }

    /// Make every subsequent command fail with `details` until
    /// [`clear_fault`][Self::clear_fault].
    pub fn inject_fault(&self, details: impl Into<String>) {
        self.state.lock().fault = Some(details.into());
    }

    /// Let commands succeed again.
    pub fn clear_fault(&self) {
        self.state.lock().fault = None;
    }
}

impl DoubleSolenoid for SimSolenoid {
    fn id(&self) -> &str {
        &self.id
    }

    fn set(&mut self, value: SolenoidValue) -> Result<(), ActuationError> {
        let mut state = self.state.lock();
        if let Some(details) = &state.fault {
            return Err(ActuationError::fault(&self.id, details.clone()));
        }
        trace!(solenoid = %self.id, ?value, "sim solenoid actuated");
        state.value = value;
        state.history.push(value);
        Ok(())
    }

    fn get(&self) -> SolenoidValue {
        self.value()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Compressor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CompressorState {
    running: bool,
    fault: Option<String>,
}

/// Simulated compressor.
#[derive(Clone, Default)]
pub struct SimCompressor {
    state: Arc<Mutex<CompressorState>>,
}

impl SimCompressor {
    /// Create a stopped simulated compressor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `start` fail with `details` until
    /// [`clear_fault`][Self::clear_fault].
    pub fn inject_fault(&self, details: impl Into<String>) {
        self.state.lock().fault = Some(details.into());
    }

    /// Let `start` succeed again.
    pub fn clear_fault(&self) {
        self.state.lock().fault = None;
    }
}

impl Compressor for SimCompressor {
    fn start(&mut self) -> Result<(), ActuationError> {
        let mut state = self.state.lock();
        if let Some(details) = &state.fault {
            return Err(ActuationError::fault("compressor", details.clone()));
        }
        state.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Camera
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CameraState {
    settings: Option<CaptureSettings>,
    exposure: Option<u32>,
    brightness: Option<u32>,
    profile_changes: usize,
    fault: Option<String>,
}

impl CameraState {
    fn check(&self, id: &str) -> Result<(), ActuationError> {
        match &self.fault {
            Some(details) => Err(ActuationError::fault(id, details.clone())),
            None => Ok(()),
        }
    }
}

/// Simulated camera that records the configuration it was given.
#[derive(Clone)]
pub struct SimCamera {
    id: String,
    state: Arc<Mutex<CameraState>>,
}

impl SimCamera {
    /// Create an unconfigured simulated camera named `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Arc::default(),
        }
    }

    /// Make every subsequent camera command fail with `details` until
    /// [`clear_fault`][Self::clear_fault].
    pub fn inject_fault(&self, details: impl Into<String>) {
        self.state.lock().fault = Some(details.into());
    }

    /// Let commands succeed again.
    pub fn clear_fault(&self) {
        self.state.lock().fault = None;
    }

    /// Capture mode from the last successful `configure`.
    pub fn settings(&self) -> Option<CaptureSettings> {
        self.state.lock().settings
    }

    /// Last exposure applied, `None` if never set.
    pub fn exposure(&self) -> Option<u32> {
        self.state.lock().exposure
    }

    /// Last brightness applied, `None` if never set.
    pub fn brightness(&self) -> Option<u32> {
        self.state.lock().brightness
    }

    /// Number of exposure commands received.
    pub fn profile_changes(&self) -> usize {
        self.state.lock().profile_changes
    }
}

impl Camera for SimCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), ActuationError> {
        let mut state = self.state.lock();
        state.check(&self.id)?;
        state.settings = Some(*settings);
        Ok(())
    }

    fn set_exposure(&mut self, exposure: u32) -> Result<(), ActuationError> {
        let mut state = self.state.lock();
        state.check(&self.id)?;
        state.exposure = Some(exposure);
        state.profile_changes += 1;
        Ok(())
    }

    fn set_brightness(&mut self, brightness: u32) -> Result<(), ActuationError> {
        let mut state = self.state.lock();
        state.check(&self.id)?;
        state.brightness = Some(brightness);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gamepad
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct GamepadCell {
    state: GamepadState,
    disconnected: bool,
}

/// Simulated gamepad whose reported state is set by the test or script.
#[derive(Clone)]
pub struct SimGamepad {
    id: String,
    cell: Arc<Mutex<GamepadCell>>,
}

impl SimGamepad {
    /// Create a connected simulated pad with every control at rest.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cell: Arc::default(),
        }
    }

    /// Replace the state returned by the next poll.
    pub fn set(&self, state: GamepadState) {
        self.cell.lock().state = state;
    }

    /// Load a raw HID report (axis array, button bitmask, POV angle) the way
    /// a physical pad delivers it.  See [`GamepadState::from_raw`].
    pub fn set_raw(&self, axes: &[f64], buttons: u32, pov: i32) {
        self.set(GamepadState::from_raw(axes, buttons, pov));
    }

    /// Apply `f` to the current state in place.
    pub fn update(&self, f: impl FnOnce(&mut GamepadState)) {
        f(&mut self.cell.lock().state);
    }

    /// Make polls fail with [`ActuationError::InputUnavailable`] while `true`.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.cell.lock().disconnected = disconnected;
    }
}

impl Gamepad for SimGamepad {
    fn id(&self) -> &str {
        &self.id
    }

    fn poll(&mut self) -> Result<GamepadState, ActuationError> {
        let cell = self.cell.lock();
        if cell.disconnected {
            return Err(ActuationError::InputUnavailable {
                device: self.id.clone(),
                details: "simulated disconnect".to_string(),
            });
        }
        Ok(cell.state)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dashboard
// ────────────────────────────────────────────────────────────────────────────

/// A value stored on the simulated dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryValue {
    Number(f64),
    Boolean(bool),
}

/// Simulated dashboard backed by a shared map.
#[derive(Clone, Default)]
pub struct SimDashboard {
    entries: Arc<Mutex<HashMap<String, TelemetryValue>>>,
}

impl SimDashboard {
    /// Create an empty simulated dashboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric entry under `key`, if one was published.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.entries.lock().get(key) {
            Some(TelemetryValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    /// Boolean entry under `key`, if one was published.
    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.entries.lock().get(key) {
            Some(TelemetryValue::Boolean(v)) => Some(*v),
            _ => None,
        }
    }

    /// Edit a flag the way an operator would from the dashboard UI.
    pub fn set_boolean(&self, key: &str, value: bool) {
        self.entries
            .lock()
            .insert(key.to_string(), TelemetryValue::Boolean(value));
    }

    /// Copy of every entry, sorted by key.
    pub fn entries(&self) -> Vec<(String, TelemetryValue)> {
        let mut out: Vec<_> = self
            .entries
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl TelemetrySink for SimDashboard {
    fn put_number(&mut self, key: &str, value: f64) {
        self.entries
            .lock()
            .insert(key.to_string(), TelemetryValue::Number(value));
    }

    fn put_boolean(&mut self, key: &str, value: bool) {
        self.set_boolean(key, value);
    }

    fn get_boolean(&self, key: &str, default: bool) -> bool {
        self.boolean(key).unwrap_or(default)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Detection source
// ────────────────────────────────────────────────────────────────────────────

/// Synthetic vision pipeline: a target box sweeping left and right across
/// the frame, lost for one frame out of every `dropout_every`.
pub struct SimPipeline {
    frame_width: f64,
    frame_height: f64,
    frame: u64,
    dropout_every: u64,
}

impl SimPipeline {
    /// Start a sweep across a `frame_width` x `frame_height` image.
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width: f64::from(frame_width),
            frame_height: f64::from(frame_height),
            frame: 0,
            dropout_every: 10,
        }
    }
}

impl Iterator for SimPipeline {
    type Item = DetectionResult;

    fn next(&mut self) -> Option<DetectionResult> {
        self.frame += 1;
        if self.dropout_every > 0 && self.frame % self.dropout_every == 0 {
            return Some(DetectionResult::empty());
        }
        let width = self.frame_width / 8.0;
        let height = self.frame_height / 6.0;
        let travel = (self.frame_width - width).max(1.0);
        let phase = (self.frame % 120) as f64 / 60.0;
        let t = if phase <= 1.0 { phase } else { 2.0 - phase };
        let x = travel * t;
        let y = (self.frame_height - height) / 2.0;
        Some(DetectionResult::new(vec![Region::new(x, y, width, height)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_motor_records_and_faults() {
        let probe = SimMotor::new("belt");
        let mut driver = probe.clone();
        driver.set_speed(-0.4).unwrap();
        assert!((probe.speed() - (-0.4)).abs() < f64::EPSILON);
        assert_eq!(probe.command_count(), 1);

        probe.inject_fault("overcurrent");
        assert!(matches!(
            driver.set_speed(0.1),
            Err(ActuationError::HardwareFault { .. })
        ));
        assert_eq!(probe.command_count(), 1);

        probe.clear_fault();
        driver.set_speed(0.1).unwrap();
        assert_eq!(probe.command_count(), 2);
    }

    #[test]
    fn sim_motor_rejects_out_of_range() {
        let mut motor = SimMotor::new("m");
        assert!(matches!(
            motor.set_speed(1.5),
            Err(ActuationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn sim_solenoid_history() {
        let probe = SimSolenoid::new("arm");
        let mut driver = probe.clone();
        driver.set(SolenoidValue::Forward).unwrap();
        driver.set(SolenoidValue::Reverse).unwrap();
        assert_eq!(
            probe.history(),
            vec![SolenoidValue::Forward, SolenoidValue::Reverse]
        );
        assert_eq!(driver.get(), SolenoidValue::Reverse);
    }

    #[test]
    fn sim_gamepad_disconnect() {
        let probe = SimGamepad::new("driver_pad");
        let mut pad = probe.clone();
        probe.update(|s| s.a = true);
        assert!(pad.poll().unwrap().a);
        probe.set_disconnected(true);
        assert!(matches!(
            pad.poll(),
            Err(ActuationError::InputUnavailable { .. })
        ));
    }

    #[test]
    fn sim_gamepad_raw_report_uses_channel_map() {
        let probe = SimGamepad::new("operator_pad");
        let mut pad = probe.clone();
        // Left stick Y forward, right trigger past halfway; X (3) and RB (6).
        probe.set_raw(&[0.0, -0.8, 0.0, 0.6, 0.0, 0.0], (1 << 2) | (1 << 5), 90);
        let state = pad.poll().unwrap();
        assert!((state.left_y - (-0.8)).abs() < f64::EPSILON);
        assert!((state.right_trigger - 0.6).abs() < f64::EPSILON);
        assert!(state.x && state.right_bumper);
        assert!(!state.a && !state.y);
        assert_eq!(state.pov, Some(90));
    }

    #[test]
    fn sim_compressor_fault() {
        let probe = SimCompressor::new();
        let mut compressor = probe.clone();
        probe.inject_fault("no pressure switch");
        assert!(compressor.start().is_err());
        assert!(!probe.is_running());

        probe.clear_fault();
        compressor.start().unwrap();
        assert!(probe.is_running());
    }

    #[test]
    fn sim_camera_fault_rejects_commands() {
        let probe = SimCamera::new("front_usb");
        let mut cam = probe.clone();
        probe.inject_fault("usb reset");
        assert!(matches!(
            cam.set_exposure(0),
            Err(ActuationError::HardwareFault { .. })
        ));
        assert_eq!(probe.exposure(), None);
        assert_eq!(probe.profile_changes(), 0);
    }

    #[test]
    fn sim_dashboard_round_trip() {
        let probe = SimDashboard::new();
        let mut sink = probe.clone();
        sink.put_number("Belt Speed", 0.65);
        sink.put_boolean("isDriveInverted", true);
        assert_eq!(probe.number("Belt Speed"), Some(0.65));
        assert_eq!(probe.boolean("isDriveInverted"), Some(true));
        assert!(!sink.get_boolean("missing", false));
        assert_eq!(probe.entries().len(), 2);
    }

    #[test]
    fn sim_camera_records_configuration() {
        let probe = SimCamera::new("front_usb");
        let mut cam = probe.clone();
        cam.configure(&CaptureSettings {
            width: 160,
            height: 120,
            fps: 15,
            white_balance: 25,
        })
        .unwrap();
        assert_eq!(probe.settings().map(|s| s.fps), Some(15));
        assert_eq!(probe.exposure(), None);
    }

    #[test]
    fn sim_pipeline_stays_in_frame_and_drops_out() {
        let frames: Vec<_> = SimPipeline::new(160, 120).take(30).collect();
        assert_eq!(frames.len(), 30);
        assert!(frames[9].candidates.is_empty());
        for frame in &frames {
            for r in &frame.candidates {
                assert!(r.x >= 0.0 && r.x + r.width <= 160.0 + f64::EPSILON);
            }
        }
    }
}
