//! Serial console adapter.
//!
//! On ESP-IDF, wraps a UART driver: non-blocking single-byte polls on the
//! receive side and best-effort writes on the transmit side (the console
//! is a human-facing debug surface; a full TX FIFO is not an error the
//! command core can act on). The host backend is a scriptable
//! in-memory console used by the integration tests.

use crate::app::ports::ConsoleOut;

#[cfg(target_os = "espidf")]
use esp_idf_hal::{delay::NON_BLOCK, uart::UartDriver};

// ───────────────────────────────────────────────────────────────
// ESP-IDF backend
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct SerialConsole<'d> {
    driver: UartDriver<'d>,
}

#[cfg(target_os = "espidf")]
impl<'d> SerialConsole<'d> {
    pub fn new(driver: UartDriver<'d>) -> Self {
        Self { driver }
    }

    /// Fetch one received byte, or `None` when the RX FIFO is empty.
    pub fn poll_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.driver.read(&mut buf, NON_BLOCK) {
            Ok(n) if n > 0 => Some(buf[0]),
            _ => None,
        }
    }
}

#[cfg(target_os = "espidf")]
impl ConsoleOut for SerialConsole<'_> {
    fn write_str(&mut self, s: &str) {
        let _ = self.driver.write(s.as_bytes());
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation backend
// ───────────────────────────────────────────────────────────────

/// Scriptable console: queue input bytes, capture all output.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct BufferConsole {
    input: std::collections::VecDeque<u8>,
    pub output: String,
}

#[cfg(not(target_os = "espidf"))]
impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by [`poll_byte`](Self::poll_byte).
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    pub fn poll_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    /// Drop captured output (between test phases).
    pub fn clear_output(&mut self) {
        self.output.clear();
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConsoleOut for BufferConsole {
    fn write_str(&mut self, s: &str) {
        self.output.push_str(s);
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;
    use crate::app::ports::ConsoleOut;

    #[test]
    fn scripted_input_drains_in_order() {
        let mut console = BufferConsole::new();
        console.push_input(b"P=8\r");
        assert_eq!(console.poll_byte(), Some(b'P'));
        assert_eq!(console.poll_byte(), Some(b'='));
        assert_eq!(console.poll_byte(), Some(b'8'));
        assert_eq!(console.poll_byte(), Some(13));
        assert_eq!(console.poll_byte(), None);
    }

    #[test]
    fn write_line_appends_crlf() {
        let mut console = BufferConsole::new();
        console.write_line("hello");
        assert_eq!(console.output, "hello\r\n");
    }
}
