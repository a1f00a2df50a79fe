//! [`RobotContext`] – shared handles constructed once at startup.
//!
//! The control loop and the guidance task each receive a clone.  Nothing
//! here is global: tests build as many independent contexts as they like.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::vision::SharedVision;

#[derive(Clone, Default)]
pub struct RobotContext {
    /// Latest target estimate (guidance writes, control loop reads).
    pub vision: SharedVision,
    targeting: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl RobotContext {
    /// Fresh context with an empty vision record, shutdown not requested,
    /// and the camera in targeting mode if `targeting` is set.
    pub fn new(targeting: bool) -> Self {
        Self {
            vision: SharedVision::new(),
            targeting: Arc::new(AtomicBool::new(targeting)),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// `true` while the camera should use the dark targeting exposure.
    pub fn targeting(&self) -> bool {
        self.targeting.load(Ordering::Acquire)
    }

    /// Switch the camera between targeting and driver exposure.
    pub fn set_targeting(&self, active: bool) {
        self.targeting.store(active, Ordering::Release);
    }

    /// Ask the control loop runner to stop after the current tick.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// `true` once [`request_shutdown`][Self::request_shutdown] (or the
    /// raw flag) has been set.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Raw shutdown flag, for signal handlers.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_flags() {
        let ctx = RobotContext::new(true);
        let other = ctx.clone();
        assert!(other.targeting());
        ctx.set_targeting(false);
        assert!(!other.targeting());

        assert!(!other.is_shutdown_requested());
        ctx.shutdown_flag().store(true, Ordering::SeqCst);
        assert!(other.is_shutdown_requested());
    }
}
