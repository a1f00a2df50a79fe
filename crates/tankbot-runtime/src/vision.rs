//! [`SharedVision`] – the one piece of state shared between the guidance
//! task (writer) and the control loop (reader).
//!
//! The estimate is a `Copy` record behind a single mutex.  Writers replace
//! the whole record in one assignment and readers copy it out, so a reader
//! can never see fields from two different updates, and either side holds
//! the lock only for the duration of a small struct copy.

use std::sync::Arc;

use parking_lot::Mutex;
use tankbot_types::VisionEstimate;

#[derive(Clone, Default)]
pub struct SharedVision {
    inner: Arc<Mutex<VisionEstimate>>,
}

impl SharedVision {
    /// New handle holding the no-detection estimate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published estimate.
    pub fn publish(&self, estimate: VisionEstimate) {
        *self.inner.lock() = estimate;
    }

    /// Copy of the latest published estimate.
    pub fn snapshot(&self) -> VisionEstimate {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn estimate(center_x: f64, center_y: f64, area: f64) -> VisionEstimate {
        VisionEstimate {
            center_x,
            center_y,
            area,
            has_detection: true,
        }
    }

    #[test]
    fn starts_without_detection() {
        assert_eq!(SharedVision::new().snapshot(), VisionEstimate::default());
    }

    #[test]
    fn publish_then_snapshot() {
        let vision = SharedVision::new();
        vision.publish(estimate(10.0, 5.0, 200.0));
        assert_eq!(vision.snapshot(), estimate(10.0, 5.0, 200.0));
    }

    #[test]
    fn clones_share_the_record() {
        let writer = SharedVision::new();
        let reader = writer.clone();
        writer.publish(estimate(1.0, 2.0, 3.0));
        assert_eq!(reader.snapshot().area, 3.0);
    }

    #[test]
    fn concurrent_reader_never_sees_mixed_record() {
        let vision = SharedVision::new();
        let a = estimate(10.0, 5.0, 200.0);
        let b = estimate(-40.0, 12.0, 900.0);
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let vision = vision.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for i in 0..20_000 {
                    vision.publish(if i % 2 == 0 { a } else { b });
                }
                done.store(true, Ordering::Release);
            })
        };

        let mut reads = 0u64;
        loop {
            let finished = done.load(Ordering::Acquire);
            let seen = vision.snapshot();
            assert!(
                seen == a || seen == b || seen == VisionEstimate::default(),
                "torn read: {seen:?}"
            );
            reads += 1;
            if finished {
                break;
            }
        }
        writer.join().unwrap();
        assert!(reads > 0);
    }
}
