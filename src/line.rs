//! Serial line buffer state machine.
//!
//! Accumulates one operator command at a time from a byte-per-call serial
//! feed. Three controls (`?`, `R`, `!`) are recognised immediately at any
//! buffer position so they stay reachable even mid-input; everything else
//! accumulates until a carriage return or until the fixed capacity is
//! exhausted.
//!
//! The terminator and overflow checks apply to the byte *just written* at
//! the cursor (write-then-test), so a carriage return landing in the last
//! slot is still recognised as a terminator rather than an overflow.

/// Fixed line capacity, including the terminator slot.
pub const LINE_CAPACITY: usize = 8;

/// Line terminator (carriage return).
pub const CARRIAGE_RETURN: u8 = 13;

/// Lines shorter than this (excluding the terminator) cannot be a valid
/// `<key>=<digits>` command and are dropped before dispatch.
pub const MIN_COMMAND_LEN: usize = 3;

/// Show the settings menu.
pub const CMD_SHOW_SETTINGS: u8 = b'?';
/// Restore compiled-in defaults and persist.
pub const CMD_RESET_DEFAULTS: u8 = b'R';
/// Trigger the irrecoverable hardware reset.
pub const CMD_REBOOT: u8 = b'!';

/// Outcome of feeding one byte into the [`LineBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A single-character control was recognised; any partial line before
    /// it has been discarded.
    Immediate(u8),
    /// A complete line (terminator stripped) is ready for dispatch.
    LineReady(heapless::Vec<u8, LINE_CAPACITY>),
    /// The byte was appended; keep feeding.
    Incomplete,
    /// Terminator arrived before [`MIN_COMMAND_LEN`] bytes. Dropped
    /// silently — line noise, not an operator mistake.
    TooShort,
    /// Capacity reached without a terminator. Dropped silently.
    Overflowed,
}

/// Bounded accumulator for one command line.
///
/// Invariant: `cursor < LINE_CAPACITY` between calls — every path that
/// would reach capacity resets to zero in the same call.
#[derive(Debug)]
pub struct LineBuffer {
    buf: [u8; LINE_CAPACITY],
    cursor: usize,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_CAPACITY],
            cursor: 0,
        }
    }

    /// Feed one byte from the serial transport.
    pub fn feed(&mut self, byte: u8) -> LineEvent {
        if matches!(byte, CMD_SHOW_SETTINGS | CMD_RESET_DEFAULTS | CMD_REBOOT) {
            self.cursor = 0;
            return LineEvent::Immediate(byte);
        }

        self.buf[self.cursor] = byte;

        if byte == CARRIAGE_RETURN {
            let len = self.cursor;
            self.cursor = 0;
            if len < MIN_COMMAND_LEN {
                return LineEvent::TooShort;
            }
            let mut line = heapless::Vec::new();
            // Cannot fail: len < LINE_CAPACITY.
            let _ = line.extend_from_slice(&self.buf[..len]);
            return LineEvent::LineReady(line);
        }

        self.cursor += 1;
        if self.cursor >= LINE_CAPACITY {
            self.cursor = 0;
            return LineEvent::Overflowed;
        }
        LineEvent::Incomplete
    }

    /// Current write position (test hook; never exceeds [`LINE_CAPACITY`]).
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
