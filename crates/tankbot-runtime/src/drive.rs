//! Drivetrain scaling and the direction-inversion latch.
//!
//! [`DriveState`] carries the signed `scale` applied to both tank-drive
//! sides.  Its magnitude is reselected every tick from the slow/boost
//! buttons; its sign persists across ticks and is flipped by the invert
//! button.
//!
//! # Inversion latch
//!
//! The `inverted` flag is an edge latch, not a toggle:
//!
//! ```text
//!            press && enabled
//!   Normal ───────────────────▶ Inverted      (scale sign flipped once)
//!      ▲                            │
//!      └──── button released ───────┘
//! ```
//!
//! Holding the button keeps the latch in `Inverted` and flips nothing
//! further; each separate press flips the drive direction once.  While the
//! global enable is false the latch does not move at all.

use serde::{Deserialize, Serialize};

/// Drive-scale magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveScales {
    pub nominal: f64,
    pub slow: f64,
    pub boost: f64,
}

impl Default for DriveScales {
    fn default() -> Self {
        Self {
            nominal: 0.9,
            slow: 0.6,
            boost: 1.0,
        }
    }
}

/// State of the inversion edge latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    Normal,
    Inverted,
}

/// Drivetrain state carried across ticks: the signed scale, the drive
/// direction and the inversion latch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveState {
    scale: f64,
    /// Drive direction.  Holds even when the selected magnitude is zero.
    reversed: bool,
    inverted: bool,
}

impl DriveState {
    /// Forward-facing drive at `nominal` scale.
    pub fn new(nominal: f64) -> Self {
        Self {
            scale: nominal.abs(),
            reversed: false,
            inverted: false,
        }
    }

    /// Signed scale for this tick.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current state of the inversion edge latch.
    pub fn latch(&self) -> LatchState {
        if self.inverted {
            LatchState::Inverted
        } else {
            LatchState::Normal
        }
    }

    /// `true` while the drive direction is flipped.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Reselect the scale magnitude.  Slow wins over boost; the current sign
    /// is preserved.
    pub fn select_scale(&mut self, slow: bool, boost: bool, scales: &DriveScales) {
        let magnitude = if slow {
            scales.slow
        } else if boost {
            scales.boost
        } else {
            scales.nominal
        };
        self.scale = self.signed(magnitude);
    }

    fn signed(&self, magnitude: f64) -> f64 {
        if self.reversed {
            -magnitude.abs()
        } else {
            magnitude.abs()
        }
    }

    /// Advance the inversion latch.  Returns `true` on the tick the drive
    /// direction flips.
    pub fn update_inversion(&mut self, pressed: bool, enabled: bool) -> bool {
        if !enabled {
            return false;
        }
        if !pressed {
            self.inverted = false;
            return false;
        }
        if self.inverted {
            return false;
        }
        self.inverted = true;
        self.reversed = !self.reversed;
        self.scale = self.signed(self.scale);
        true
    }

    /// Left/right motor commands from the two stick Y axes.
    ///
    /// Forward stick is negative, so both sides are negated.  When the
    /// direction is reversed the sticks are also swapped, which keeps
    /// steering intuitive from the back of the robot.  Results are clamped
    /// to `[-1, 1]`.
    pub fn tank_commands(&self, left_y: f64, right_y: f64) -> (f64, f64) {
        let (left_in, right_in) = if self.reversed {
            (-right_y, -left_y)
        } else {
            (-left_y, -right_y)
        };
        (
            (self.scale * left_in).clamp(-1.0, 1.0),
            (self.scale * right_in).clamp(-1.0, 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn default_scale_is_nominal() {
        let mut drive = DriveState::new(0.9);
        drive.select_scale(false, false, &DriveScales::default());
        assert!((drive.scale() - 0.9).abs() < EPS);
    }

    #[test]
    fn slow_beats_boost() {
        let mut drive = DriveState::new(0.9);
        drive.select_scale(true, true, &DriveScales::default());
        assert!((drive.scale() - 0.6).abs() < EPS);
        drive.select_scale(false, true, &DriveScales::default());
        assert!((drive.scale() - 1.0).abs() < EPS);
    }

    #[test]
    fn selection_preserves_sign() {
        let mut drive = DriveState::new(0.9);
        drive.update_inversion(true, true);
        drive.select_scale(true, false, &DriveScales::default());
        assert!((drive.scale() - (-0.6)).abs() < EPS);
        drive.select_scale(false, false, &DriveScales::default());
        assert!((drive.scale() - (-0.9)).abs() < EPS);
    }

    #[test]
    fn held_button_latches_once_and_release_resets() {
        let mut drive = DriveState::new(0.9);
        assert!(drive.update_inversion(true, true));
        assert_eq!(drive.latch(), LatchState::Inverted);
        assert!(!drive.update_inversion(true, true));
        assert!(!drive.update_inversion(true, true));
        assert_eq!(drive.latch(), LatchState::Inverted);
        assert!(drive.is_reversed());

        assert!(!drive.update_inversion(false, true));
        assert_eq!(drive.latch(), LatchState::Normal);
        // Direction stays flipped until the next press.
        assert!(drive.is_reversed());

        assert!(drive.update_inversion(true, true));
        assert!(!drive.is_reversed());
    }

    #[test]
    fn disabled_inversion_freezes_latch() {
        let mut drive = DriveState::new(0.9);
        assert!(!drive.update_inversion(true, false));
        assert_eq!(drive.latch(), LatchState::Normal);
        assert!(!drive.is_reversed());

        drive.update_inversion(true, true);
        // Releasing while disabled does not reset the latch.
        drive.update_inversion(false, false);
        assert_eq!(drive.latch(), LatchState::Inverted);
    }

    #[test]
    fn full_forward_drives_both_sides_forward() {
        let drive = DriveState::new(0.9);
        let (left, right) = drive.tank_commands(-1.0, -1.0);
        assert!((left - 0.9).abs() < EPS);
        assert!((right - 0.9).abs() < EPS);
    }

    #[test]
    fn zero_magnitude_keeps_direction() {
        let scales = DriveScales {
            nominal: 0.9,
            slow: 0.0,
            boost: 1.0,
        };
        let mut drive = DriveState::new(scales.nominal);
        drive.update_inversion(true, true);
        drive.update_inversion(false, true);

        drive.select_scale(true, false, &scales);
        assert!(drive.is_reversed());
        assert_eq!(drive.tank_commands(-1.0, -1.0), (0.0, 0.0));

        drive.select_scale(false, false, &scales);
        assert!(drive.is_reversed());
        assert!((drive.scale() - (-0.9)).abs() < EPS);
    }

    #[test]
    fn press_at_zero_magnitude_still_flips() {
        let scales = DriveScales {
            nominal: 0.9,
            slow: 0.0,
            boost: 1.0,
        };
        let mut drive = DriveState::new(scales.nominal);
        drive.select_scale(true, false, &scales);
        assert!(drive.update_inversion(true, true));
        assert!(drive.is_reversed());
        drive.select_scale(false, false, &scales);
        assert!((drive.scale() - (-0.9)).abs() < EPS);
    }

    #[test]
    fn reversed_drive_swaps_sticks() {
        let mut drive = DriveState::new(0.9);
        drive.update_inversion(true, true);
        // Only the left stick pushed forward.
        let (left, right) = drive.tank_commands(-1.0, 0.0);
        assert!((left - 0.0).abs() < EPS);
        assert!((right - (-0.9)).abs() < EPS);
    }
}
