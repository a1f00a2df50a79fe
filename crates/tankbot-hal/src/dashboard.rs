//! `TelemetrySink` – the key/value dashboard the robot reports to.
//!
//! Values are overwritten every tick; no history is kept.  The dashboard
//! is also a source of operator-editable flags (see
//! [`TelemetrySink::get_boolean`]).

/// Key/value telemetry channel.
pub trait TelemetrySink: Send + Sync {
    fn put_number(&mut self, key: &str, value: f64);

    fn put_boolean(&mut self, key: &str, value: bool);

    /// Read a boolean that an operator may have edited on the dashboard,
    /// or `default` if the key was never published.
    fn get_boolean(&self, key: &str, default: bool) -> bool;
}
