//! Port traits — the hexagonal boundary between the settings console and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ConsoleService (domain)
//! ```
//!
//! Driven adapters (EEPROM, UART, watchdog) implement these traits. The
//! [`ConsoleService`](super::service::ConsoleService) consumes them via
//! generics at call sites, so the domain core never touches hardware
//! directly and the whole command protocol is testable with mock ports.

// ───────────────────────────────────────────────────────────────
// Non-volatile store port (domain ↔ EEPROM / flash)
// ───────────────────────────────────────────────────────────────

/// Byte-addressable persistent storage.
///
/// Modelled on an EEPROM cell array: reads and writes are synchronous,
/// bounded, and assumed to succeed — if the storage device itself fails
/// the controller is unrecoverable anyway, so the API is infallible.
/// Unwritten cells read back as `0xFF` (erased flash/EEPROM convention).
pub trait NonVolatileStore {
    /// Read one byte at `offset`.
    fn read_byte(&self, offset: usize) -> u8;

    /// Write one byte at `offset`.
    fn write_byte(&mut self, offset: usize, value: u8);

    /// Total usable cells. Offsets must stay below this.
    fn capacity(&self) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Console output port (domain → serial transport)
// ───────────────────────────────────────────────────────────────

/// Output side of the operator console.
///
/// The menu presenter and error reporting write through this port;
/// adapters decide where the text goes (UART, log, test buffer).
pub trait ConsoleOut {
    /// Write a string without a line ending.
    fn write_str(&mut self, s: &str);

    /// Write a string followed by `\r\n`.
    fn write_line(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }
}

// ───────────────────────────────────────────────────────────────
// Reset port (domain → watchdog hardware)
// ───────────────────────────────────────────────────────────────

/// Deliberate, irrecoverable hardware reset.
///
/// The divergent return type makes the "does not return" contract
/// explicit: the implementation arms a watchdog with a short timeout and
/// parks until it fires.
pub trait ResetPort {
    /// Force a hardware reset after roughly `timeout_ms` milliseconds.
    fn trigger_watchdog_reset(&mut self, timeout_ms: u32) -> !;
}
