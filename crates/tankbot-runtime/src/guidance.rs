//! [`Guidance`] – the vision consumer task.
//!
//! Runs beside the control loop for the life of the process, at whatever
//! rate the camera pipeline produces frames.  For each [`DetectionResult`]:
//!
//! 1. Keep the camera exposure in step with the shared targeting flag
//!    (dark profile while targeting, viewable profile otherwise).  The
//!    camera is only reconfigured when the flag changes.
//! 2. If the frame has a candidate, derive a [`VisionEstimate`] from the
//!    first one and publish it to [`SharedVision`] as one record.
//! 3. If the frame is empty, publish nothing.  The previous estimate stays
//!    in place and `has_detection` is never cleared.
//!
//! Frames are handed over through a `tokio::sync::mpsc` channel, which
//! keeps at most one update in flight at a time: the task publishes a frame
//! before it receives the next.

use tankbot_hal::{Camera, CaptureSettings, ExposureProfile};
use tankbot_types::{ActuationError, DetectionResult, VisionEstimate};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::context::RobotContext;
use crate::vision::SharedVision;

/// Camera and frame-geometry settings for [`Guidance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidanceConfig {
    pub capture: CaptureSettings,
    /// Exposure while targeting (dark, so only lit retro-reflective tape
    /// shows up).
    pub targeting_profile: ExposureProfile,
    /// Exposure for the driver's camera view.
    pub driver_profile: ExposureProfile,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            capture: CaptureSettings {
                width: 160,
                height: 120,
                fps: 15,
                white_balance: 25,
            },
            targeting_profile: ExposureProfile {
                exposure: 0,
                brightness: 0,
            },
            driver_profile: ExposureProfile {
                exposure: 25,
                brightness: 25,
            },
        }
    }
}

/// Vision consumer: owns the camera and publishes target estimates into
/// the context's [`SharedVision`].
pub struct Guidance {
    config: GuidanceConfig,
    camera: Box<dyn Camera>,
    vision: SharedVision,
    ctx: RobotContext,
    /// Targeting flag value the camera exposure currently matches.
    applied_targeting: Option<bool>,
    frames: u64,
}

impl Guidance {
    /// Bind `camera` to the shared vision record and targeting flag in
    /// `ctx`.  Nothing is sent to the camera until [`start`][Self::start].
    pub fn new(config: GuidanceConfig, camera: Box<dyn Camera>, ctx: &RobotContext) -> Self {
        Self {
            config,
            camera,
            vision: ctx.vision.clone(),
            ctx: ctx.clone(),
            applied_targeting: None,
            frames: 0,
        }
    }

    /// Apply the capture mode.  Called once before the first frame.
    ///
    /// # Errors
    ///
    /// Propagates the camera driver's [`ActuationError`].
    pub fn start(&mut self) -> Result<(), ActuationError> {
        self.camera.configure(&self.config.capture)?;
        info!(
            camera = %self.camera.id(),
            width = self.config.capture.width,
            height = self.config.capture.height,
            fps = self.config.capture.fps,
            "guidance camera configured"
        );
        Ok(())
    }

    /// Frames processed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Handle one pipeline result.  Returns the estimate that was published,
    /// or `None` when the frame had no candidates and the previous estimate
    /// was kept.
    pub fn process(&mut self, result: &DetectionResult) -> Option<VisionEstimate> {
        if let Err(e) = self.sync_exposure() {
            warn!(error = %e, "camera exposure update failed");
        }
        self.frames += 1;

        let region = result.best()?;
        let estimate = VisionEstimate::from_region(
            region,
            f64::from(self.config.capture.width),
            f64::from(self.config.capture.height),
        );
        self.vision.publish(estimate);
        Some(estimate)
    }

    /// Consume frames until the pipeline closes its channel.  Returns the
    /// number of frames processed.
    pub async fn run(mut self, mut frames: mpsc::Receiver<DetectionResult>) -> u64 {
        if let Err(e) = self.start() {
            warn!(error = %e, "camera configuration failed; continuing with driver defaults");
        }
        while let Some(result) = frames.recv().await {
            self.process(&result);
        }
        info!(frames = self.frames, "vision pipeline closed; guidance stopped");
        self.frames
    }

    fn sync_exposure(&mut self) -> Result<(), ActuationError> {
        let targeting = self.ctx.targeting();
        if self.applied_targeting == Some(targeting) {
            return Ok(());
        }
        let profile = if targeting {
            self.config.targeting_profile
        } else {
            self.config.driver_profile
        };
        self.camera.apply_profile(profile)?;
        debug!(targeting, ?profile, "camera exposure switched");
        self.applied_targeting = Some(targeting);
        Ok(())
    }
}
