//! `Camera` capability trait and the settings the guidance task applies.
//!
//! Frame capture itself belongs to the vision pipeline; the robot only
//! configures the device.

use tankbot_types::ActuationError;

/// Capture mode applied once when guidance starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Manual white balance, in the driver's units.
    pub white_balance: u32,
}

/// Exposure and brightness pair, switched at run time between the dark
/// targeting profile and the human-viewable driver profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposureProfile {
    pub exposure: u32,
    pub brightness: u32,
}

/// A configurable camera.
pub trait Camera: Send + Sync {
    /// Stable identifier, e.g. `"front_usb"`.
    fn id(&self) -> &str;

    /// Apply resolution, frame rate and white balance.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError::HardwareFault`] if the device rejects the
    /// mode.
    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), ActuationError>;

    /// Set manual exposure.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError::HardwareFault`] on device failure.
    fn set_exposure(&mut self, exposure: u32) -> Result<(), ActuationError>;

    /// Set brightness.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError::HardwareFault`] on device failure.
    fn set_brightness(&mut self, brightness: u32) -> Result<(), ActuationError>;

    /// Apply both halves of `profile`, exposure first.
    fn apply_profile(&mut self, profile: ExposureProfile) -> Result<(), ActuationError> {
        self.set_exposure(profile.exposure)?;
        self.set_brightness(profile.brightness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockCamera {
        calls: Vec<(&'static str, u32)>,
    }

    impl Camera for MockCamera {
        fn id(&self) -> &str {
            "front_usb"
        }

        fn configure(&mut self, settings: &CaptureSettings) -> Result<(), ActuationError> {
            self.calls.push(("fps", settings.fps));
            Ok(())
        }

        fn set_exposure(&mut self, exposure: u32) -> Result<(), ActuationError> {
            self.calls.push(("exposure", exposure));
            Ok(())
        }

        fn set_brightness(&mut self, brightness: u32) -> Result<(), ActuationError> {
            self.calls.push(("brightness", brightness));
            Ok(())
        }
    }

    #[test]
    fn apply_profile_sets_exposure_then_brightness() {
        let mut cam = MockCamera::default();
        cam.apply_profile(ExposureProfile {
            exposure: 25,
            brightness: 30,
        })
        .unwrap();
        assert_eq!(cam.calls, vec![("exposure", 25), ("brightness", 30)]);
    }
}
