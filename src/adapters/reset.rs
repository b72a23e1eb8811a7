//! Watchdog-backed reset adapter.

use crate::app::ports::ResetPort;
use crate::drivers::watchdog;

/// Implements [`ResetPort`] by arming the task watchdog with a short
/// timeout and never feeding it.
pub struct WatchdogReset;

impl ResetPort for WatchdogReset {
    fn trigger_watchdog_reset(&mut self, timeout_ms: u32) -> ! {
        watchdog::force_reset(timeout_ms)
    }
}
