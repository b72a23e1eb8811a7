//! Console service — the owning context for the command protocol.
//!
//! [`ConsoleService`] owns the [`SettingsRecord`] and [`LineBuffer`] and
//! drives one command cycle per fed byte:
//!
//! ```text
//! Idle ─▶ Accumulating ─▶ { Applied | Rejected | Dropped } ─▶ Idle
//! ```
//!
//! There is no cross-command state beyond the settings record itself.
//! All I/O flows through port traits injected at call sites, so the full
//! protocol runs against mock ports in tests.

use core::fmt::Write;

use log::info;

use crate::error::CommandError;
use crate::line::{CMD_REBOOT, CMD_RESET_DEFAULTS, CMD_SHOW_SETTINGS, LineBuffer, LineEvent};
use crate::menu;
use crate::settings::{LoadOutcome, SettingsRecord};

use super::commands;
use super::ports::{ConsoleOut, NonVolatileStore, ResetPort};

/// Watchdog timeout armed by the reboot control. Short enough that the
/// reset is effectively immediate.
pub const REBOOT_WDT_TIMEOUT_MS: u32 = 15;

const VERSION_BANNER: &str = concat!("ETHER POWER SWITCH VERSION: ", env!("CARGO_PKG_VERSION"));

/// Where one command cycle ended up. The `Dropped` variants make the
/// silent discards assertable without any operator-visible effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Byte appended; line still accumulating.
    Accumulating,
    /// `?` — menu rendered, nothing mutated.
    MenuShown,
    /// `R` — defaults installed and persisted.
    DefaultsRestored,
    /// A set command succeeded; carries the setting key.
    Applied { key: u8 },
    /// A well-formed-but-invalid line was refused and reported.
    Rejected(CommandError),
    /// Line noise discarded with no operator-visible effect.
    Dropped(DropReason),
}

/// Why a line was silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Capacity reached without a terminator.
    Overflow,
    /// Terminator arrived before a plausible command length.
    TooShort,
}

pub struct ConsoleService {
    settings: SettingsRecord,
    line: LineBuffer,
    /// Screensaver hook: refreshed on every fed byte, consulted by the
    /// surrounding loop, never part of command correctness.
    last_input_ms: u64,
}

impl ConsoleService {
    /// Load settings from storage and build the service.
    ///
    /// An incompatible stored image is replaced by defaults inside
    /// [`SettingsRecord::load`]; the failure is reported to the operator
    /// exactly once, here.
    pub fn boot(store: &mut impl NonVolatileStore, out: &mut impl ConsoleOut) -> Self {
        let (settings, outcome) = SettingsRecord::load(store);
        if let LoadOutcome::DefaultsRestored(_) = outcome {
            out.write_line("Error: Reading stored settings failed");
            out.write_line("Loading defaults");
        }
        Self {
            settings,
            line: LineBuffer::new(),
            last_input_ms: 0,
        }
    }

    /// Feed one byte from the serial transport and run the cycle to
    /// completion. `now_ms` is a monotonic timestamp from the caller.
    ///
    /// The reboot control diverges through `reset` and never returns.
    pub fn feed(
        &mut self,
        byte: u8,
        now_ms: u64,
        store: &mut impl NonVolatileStore,
        out: &mut impl ConsoleOut,
        reset: &mut impl ResetPort,
    ) -> CycleOutcome {
        self.last_input_ms = now_ms;

        match self.line.feed(byte) {
            LineEvent::Immediate(CMD_SHOW_SETTINGS) => {
                out.write_line(VERSION_BANNER);
                menu::render(&self.settings, out);
                CycleOutcome::MenuShown
            }
            LineEvent::Immediate(CMD_RESET_DEFAULTS) => {
                self.settings.reset_to_defaults(store);
                CycleOutcome::DefaultsRestored
            }
            LineEvent::Immediate(CMD_REBOOT) => {
                info!("console: reboot requested");
                reset.trigger_watchdog_reset(REBOOT_WDT_TIMEOUT_MS)
            }
            LineEvent::Immediate(_) => CycleOutcome::Accumulating,
            LineEvent::LineReady(line) => self.handle_line(&line, store, out),
            LineEvent::Incomplete => CycleOutcome::Accumulating,
            LineEvent::TooShort => CycleOutcome::Dropped(DropReason::TooShort),
            LineEvent::Overflowed => CycleOutcome::Dropped(DropReason::Overflow),
        }
    }

    /// Dispatch one completed line. On success the observable side effect
    /// is always the full re-rendered menu, not a delta.
    pub fn handle_line(
        &mut self,
        line: &[u8],
        store: &mut impl NonVolatileStore,
        out: &mut impl ConsoleOut,
    ) -> CycleOutcome {
        match self.apply_line(line, store) {
            Ok(key) => {
                menu::render(&self.settings, out);
                CycleOutcome::Applied { key }
            }
            Err(e) => {
                let mut msg: heapless::String<40> = heapless::String::new();
                let _ = write!(msg, "{e}");
                out.write_line(&msg);
                CycleOutcome::Rejected(e)
            }
        }
    }

    fn apply_line(
        &mut self,
        line: &[u8],
        store: &mut impl NonVolatileStore,
    ) -> Result<u8, CommandError> {
        let cmd = commands::parse_line(line)?;
        let spec = commands::lookup(cmd.key)
            .ok_or_else(|| CommandError::UnknownCommand(commands::echo_line(line)))?;

        spec.apply(&mut self.settings, cmd.value);
        self.settings.persist(store);
        info!("console: {} set ({}={})", spec.label, cmd.key as char, cmd.value);
        Ok(cmd.key)
    }

    /// Current in-memory settings.
    pub fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    /// Timestamp of the most recently fed byte.
    pub fn last_input_ms(&self) -> u64 {
        self.last_input_ms
    }
}
