//! Fixed-period driver for [`ControlLoop`].
//!
//! [`run`] ticks the loop on a `tokio` interval until the shared shutdown
//! flag is raised.  A tick that runs longer than the period is counted as
//! an overrun and logged; the interval then skips the missed deadlines
//! instead of bursting to catch up.

use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::context::RobotContext;
use crate::control_loop::ControlLoop;

/// Timing and fault counters for one [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    pub iterations: u64,
    pub overruns: u64,
    /// Ticks in which at least one subsystem reported a fault.
    pub faulted_ticks: u64,
    pub max_tick: Duration,
    pub last_tick: Duration,
}

impl TickStats {
    /// Record one tick's execution time.  Returns `true` if it overran
    /// `period`.
    pub fn record(&mut self, elapsed: Duration, period: Duration) -> bool {
        self.iterations += 1;
        self.last_tick = elapsed;
        self.max_tick = self.max_tick.max(elapsed);
        let overrun = elapsed > period;
        if overrun {
            self.overruns += 1;
        }
        overrun
    }
}

/// Tick `control` every `period` until `ctx` requests shutdown.
pub async fn run(control: &mut ControlLoop, period: Duration, ctx: &RobotContext) -> TickStats {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats = TickStats::default();

    info!(period_ms = period.as_millis() as u64, "control loop started");
    loop {
        interval.tick().await;
        if ctx.is_shutdown_requested() {
            break;
        }

        let started = Instant::now();
        let report = control.tick();
        let elapsed = started.elapsed();

        if !report.is_clean() {
            stats.faulted_ticks += 1;
        }
        if stats.record(elapsed, period) {
            warn!(
                elapsed_us = elapsed.as_micros() as u64,
                period_us = period.as_micros() as u64,
                "control tick overran its period"
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros() as u64, "tick");
        }
    }
    info!(
        iterations = stats.iterations,
        overruns = stats.overruns,
        faulted_ticks = stats.faulted_ticks,
        "control loop stopped"
    );
    stats
}
