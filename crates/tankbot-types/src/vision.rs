//! Vision pipeline output and the estimate derived from it.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of one candidate target, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    /// Box with top-left corner `(x, y)`.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box area in square pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Output of one processed camera frame.
///
/// Candidate order is defined by the pipeline; the first entry is the one
/// the robot tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub candidates: Vec<Region>,
}

impl DetectionResult {
    /// Result holding `candidates`, best first.
    pub fn new(candidates: Vec<Region>) -> Self {
        Self { candidates }
    }

    /// A frame in which nothing was found.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The pipeline's preferred candidate, if any.
    pub fn best(&self) -> Option<&Region> {
        self.candidates.first()
    }
}

/// Latest target estimate shared between the guidance task and the control
/// loop.
///
/// This is a `Copy` value so that it is always published and read as one
/// unit.  The default is the "nothing seen yet" estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionEstimate {
    /// Horizontal offset of the target from the image centre.
    pub center_x: f64,
    /// Vertical offset of the target from the image centre.
    pub center_y: f64,
    /// Target size in square pixels.
    pub area: f64,
    pub has_detection: bool,
}

impl VisionEstimate {
    /// Derive an estimate from `region` in a `frame_width`×`frame_height`
    /// image.
    pub fn from_region(region: &Region, frame_width: f64, frame_height: f64) -> Self {
        Self {
            center_x: 2.0 * region.x + region.width - frame_width / 2.0,
            center_y: 2.0 * region.y + region.height - frame_height / 2.0,
            area: region.area(),
            has_detection: true,
        }
    }
}
