//! Operator input samples.
//!
//! A [`GamepadState`] is one device's full control surface captured at a
//! single instant; an [`InputSnapshot`] pairs the driver and operator
//! devices for one control tick.  Both are plain values: they are replaced
//! wholesale every tick and never mutated in place.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Raw channel maps
// ────────────────────────────────────────────────────────────────────────────

/// Analog channels of the operator gamepad, tagged with their raw HID axis
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    LeftX = 0,
    LeftY = 1,
    LeftTrigger = 2,
    RightTrigger = 3,
    RightX = 4,
    RightY = 5,
}

impl Axis {
    /// Raw HID axis index.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Digital channels of the operator gamepad, tagged with their raw 1-based
/// HID button number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    A = 1,
    B = 2,
    X = 3,
    Y = 4,
    LeftBumper = 5,
    RightBumper = 6,
    Back = 7,
    Start = 8,
    LeftStick = 9,
    RightStick = 10,
}

impl Button {
    /// Raw 1-based HID button number.
    pub fn number(self) -> u8 {
        self as u8
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GamepadState
// ────────────────────────────────────────────────────────────────────────────

/// One gamepad's axes and buttons at a single instant.
///
/// Stick axes range over `[-1, 1]` with `0` at rest (negative Y is stick
/// pushed forward).  Triggers range over `[0, 1]`.  The default value is
/// the neutral pad: everything centred and released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadState {
    pub left_x: f64,
    pub left_y: f64,
    pub right_x: f64,
    pub right_y: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub left_bumper: bool,
    pub right_bumper: bool,
    pub back: bool,
    pub start: bool,
    pub left_stick: bool,
    pub right_stick: bool,
    /// D-pad angle in degrees (0 = up, clockwise), `None` when released.
    pub pov: Option<u16>,
}

impl GamepadState {
    /// Build a state from a raw HID report.
    ///
    /// `axes` is indexed by [`Axis::index`]; bit `n - 1` of `buttons` holds
    /// button number `n`.  Missing axes read as `0` and every axis is passed
    /// through [`sanitize_axis`].  A negative `pov` means released.
    pub fn from_raw(axes: &[f64], buttons: u32, pov: i32) -> Self {
        let axis = |a: Axis| sanitize_axis(axes.get(a.index()).copied().unwrap_or(0.0));
        let pressed = |b: Button| buttons & (1 << (b.number() - 1)) != 0;
        Self {
            left_x: axis(Axis::LeftX),
            left_y: axis(Axis::LeftY),
            right_x: axis(Axis::RightX),
            right_y: axis(Axis::RightY),
            left_trigger: axis(Axis::LeftTrigger),
            right_trigger: axis(Axis::RightTrigger),
            a: pressed(Button::A),
            b: pressed(Button::B),
            x: pressed(Button::X),
            y: pressed(Button::Y),
            left_bumper: pressed(Button::LeftBumper),
            right_bumper: pressed(Button::RightBumper),
            back: pressed(Button::Back),
            start: pressed(Button::Start),
            left_stick: pressed(Button::LeftStick),
            right_stick: pressed(Button::RightStick),
            pov: u16::try_from(pov).ok(),
        }
    }

    /// Read an analog channel by name.
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::LeftX => self.left_x,
            Axis::LeftY => self.left_y,
            Axis::LeftTrigger => self.left_trigger,
            Axis::RightTrigger => self.right_trigger,
            Axis::RightX => self.right_x,
            Axis::RightY => self.right_y,
        }
    }

    /// Read a digital channel by name.
    pub fn button(&self, button: Button) -> bool {
        match button {
            Button::A => self.a,
            Button::B => self.b,
            Button::X => self.x,
            Button::Y => self.y,
            Button::LeftBumper => self.left_bumper,
            Button::RightBumper => self.right_bumper,
            Button::Back => self.back,
            Button::Start => self.start,
            Button::LeftStick => self.left_stick,
            Button::RightStick => self.right_stick,
        }
    }

    /// Return a copy with every axis clamped to `[-1, 1]` and non-finite
    /// readings replaced by `0`.
    pub fn sanitized(mut self) -> Self {
        self.left_x = sanitize_axis(self.left_x);
        self.left_y = sanitize_axis(self.left_y);
        self.right_x = sanitize_axis(self.right_x);
        self.right_y = sanitize_axis(self.right_y);
        self.left_trigger = sanitize_axis(self.left_trigger);
        self.right_trigger = sanitize_axis(self.right_trigger);
        self
    }
}

/// Clamp an axis reading to `[-1, 1]`; `NaN` and infinities read as `0`.
pub fn sanitize_axis(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// InputSnapshot
// ────────────────────────────────────────────────────────────────────────────

/// Both operator devices sampled for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Driver pad (port 0): drivetrain, boost/slow, inversion, climb stands.
    pub driver: GamepadState,
    /// Operator pad (port 1): belt, hatch, intake arm.
    pub operator: GamepadState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_maps_channel_indices() {
        let axes = [0.1, -0.5, 0.3, 0.9, -0.2, 1.0];
        // A (bit 0) and Y (bit 3) pressed.
        let pad = GamepadState::from_raw(&axes, 0b1001, -1);
        assert!((pad.left_y - (-0.5)).abs() < f64::EPSILON);
        assert!((pad.right_trigger - 0.9).abs() < f64::EPSILON);
        assert!((pad.right_y - 1.0).abs() < f64::EPSILON);
        assert!(pad.a);
        assert!(pad.y);
        assert!(!pad.b);
        assert!(!pad.x);
        assert_eq!(pad.pov, None);
    }

    #[test]
    fn from_raw_tolerates_short_axis_report() {
        let pad = GamepadState::from_raw(&[0.4], 0, 90);
        assert!((pad.left_x - 0.4).abs() < f64::EPSILON);
        assert_eq!(pad.right_y, 0.0);
        assert_eq!(pad.pov, Some(90));
    }

    #[test]
    fn sanitized_clamps_and_zeroes_garbage() {
        let pad = GamepadState {
            left_y: -3.0,
            right_y: f64::NAN,
            left_trigger: f64::INFINITY,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(pad.left_y, -1.0);
        assert_eq!(pad.right_y, 0.0);
        assert_eq!(pad.left_trigger, 0.0);
    }

    #[test]
    fn named_accessors_match_fields() {
        let pad = GamepadState {
            right_trigger: 0.7,
            left_bumper: true,
            ..Default::default()
        };
        assert!((pad.axis(Axis::RightTrigger) - 0.7).abs() < f64::EPSILON);
        assert!(pad.button(Button::LeftBumper));
        assert!(!pad.button(Button::RightBumper));
    }

    #[test]
    fn default_snapshot_is_neutral() {
        let snap = InputSnapshot::default();
        assert_eq!(snap.driver, GamepadState::default());
        assert!(!snap.operator.a);
        assert_eq!(snap.operator.left_y, 0.0);
    }
}
