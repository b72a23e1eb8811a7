//! Integration tests: serial bytes → ConsoleService → settings + storage
//! + rendered output, end to end through mock ports.

#![cfg(not(target_os = "espidf"))]

use etherpower::adapters::serial::BufferConsole;
use etherpower::app::ports::{NonVolatileStore, ResetPort};
use etherpower::app::service::{ConsoleService, CycleOutcome, DropReason};
use etherpower::error::CommandError;
use etherpower::settings::{BASE_OFFSET, IMAGE_LEN, SETTINGS_VERSION, SettingsRecord};

// ── Mock ports ─────────────────────────────────────────────────

struct MemStore {
    cells: Vec<u8>,
    writes: usize,
}

impl MemStore {
    fn fresh() -> Self {
        Self {
            cells: vec![0xFF; 128],
            writes: 0,
        }
    }

    /// Pre-seeded with a valid default image, as after a healthy boot.
    fn provisioned() -> Self {
        let mut store = Self::fresh();
        SettingsRecord::default().persist(&mut store);
        store.writes = 0;
        store
    }

    fn image(&self) -> [u8; IMAGE_LEN] {
        let mut image = [0u8; IMAGE_LEN];
        image.copy_from_slice(&self.cells[BASE_OFFSET..BASE_OFFSET + IMAGE_LEN]);
        image
    }
}

impl NonVolatileStore for MemStore {
    fn read_byte(&self, offset: usize) -> u8 {
        self.cells[offset]
    }
    fn write_byte(&mut self, offset: usize, value: u8) {
        self.writes += 1;
        self.cells[offset] = value;
    }
    fn capacity(&self) -> usize {
        self.cells.len()
    }
}

struct PanicReset;

impl ResetPort for PanicReset {
    fn trigger_watchdog_reset(&mut self, _timeout_ms: u32) -> ! {
        panic!("watchdog reset");
    }
}

// ── Helpers ────────────────────────────────────────────────────

fn boot(store: &mut MemStore, out: &mut BufferConsole) -> ConsoleService {
    ConsoleService::boot(store, out)
}

fn feed_all(
    service: &mut ConsoleService,
    store: &mut MemStore,
    out: &mut BufferConsole,
    bytes: &[u8],
) -> CycleOutcome {
    let mut reset = PanicReset;
    let mut last = CycleOutcome::Accumulating;
    for (i, &b) in bytes.iter().enumerate() {
        last = service.feed(b, i as u64, store, out, &mut reset);
    }
    last
}

// ── Set commands ───────────────────────────────────────────────

#[test]
fn set_command_mutates_persists_and_rerenders_menu() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    out.clear_output();

    // 'C' is server address octet 3.
    let outcome = feed_all(&mut service, &mut store, &mut out, b"C=150\r");

    assert_eq!(outcome, CycleOutcome::Applied { key: b'C' });
    assert_eq!(service.settings().server_address, [192, 168, 150, 177]);
    assert_eq!(store.image(), service.settings().encode(), "full image persisted");
    assert!(out.output.contains("EtherPower Settings Menu"));
    assert!(out.output.contains("I=192.168.150.177"));
}

#[test]
fn invalid_value_is_reported_and_leaves_record_unchanged() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    let before = service.settings().clone();
    let writes_before = store.writes;
    out.clear_output();

    let outcome = feed_all(&mut service, &mut store, &mut out, b"C=15X\r");

    assert_eq!(outcome, CycleOutcome::Rejected(CommandError::InvalidValue));
    assert_eq!(service.settings(), &before);
    assert_eq!(store.writes, writes_before, "no persist on rejection");
    assert!(out.output.contains("Invalid setting value"));
    assert!(!out.output.contains("Settings Menu"));
}

#[test]
fn unknown_key_echoes_the_offending_line() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    let before = service.settings().clone();
    out.clear_output();

    let outcome = feed_all(&mut service, &mut store, &mut out, b"Z=5\r");

    match outcome {
        CycleOutcome::Rejected(CommandError::UnknownCommand(line)) => {
            assert_eq!(line.as_str(), "Z=5");
        }
        other => panic!("expected UnknownCommand, got {other:?}"),
    }
    assert!(out.output.contains("Command Error: Z=5"));
    assert_eq!(service.settings(), &before);
}

#[test]
fn missing_separator_is_reported() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    out.clear_output();

    let outcome = feed_all(&mut service, &mut store, &mut out, b"P80\r");

    assert_eq!(
        outcome,
        CycleOutcome::Rejected(CommandError::MalformedCommand)
    );
    assert!(out.output.contains("Missing '=' in command"));
}

#[test]
fn oversized_value_clamps_into_range() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);

    let outcome = feed_all(&mut service, &mut store, &mut out, b"P=99999\r");

    assert_eq!(outcome, CycleOutcome::Applied { key: b'P' });
    assert_eq!(service.settings().server_port, 255);
}

#[test]
fn netmask_prefix_command_expands_to_mask() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);

    let outcome = feed_all(&mut service, &mut store, &mut out, b"N=16\r");

    assert_eq!(outcome, CycleOutcome::Applied { key: b'N' });
    assert_eq!(service.settings().server_netmask, [255, 255, 0, 0]);
}

// ── Immediate controls ─────────────────────────────────────────

#[test]
fn show_settings_mid_line_discards_partial_input() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    out.clear_output();

    // Half-typed command, then the menu control.
    feed_all(&mut service, &mut store, &mut out, b"C=1");
    let outcome = feed_all(&mut service, &mut store, &mut out, b"?");

    assert_eq!(outcome, CycleOutcome::MenuShown);
    assert!(out.output.contains("ETHER POWER SWITCH VERSION:"));
    assert!(out.output.contains("EtherPower Settings Menu"));
    // The discarded prefix must not poison the next command.
    out.clear_output();
    let outcome = feed_all(&mut service, &mut store, &mut out, b"P=8\r");
    assert_eq!(outcome, CycleOutcome::Applied { key: b'P' });
    assert_eq!(service.settings().server_port, 8);
}

#[test]
fn reset_control_restores_defaults_and_persists_without_menu() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    feed_all(&mut service, &mut store, &mut out, b"P=9\r");
    assert_ne!(service.settings(), &SettingsRecord::default());
    out.clear_output();

    let outcome = feed_all(&mut service, &mut store, &mut out, b"R");

    assert_eq!(outcome, CycleOutcome::DefaultsRestored);
    assert_eq!(service.settings(), &SettingsRecord::default());
    assert_eq!(store.image(), SettingsRecord::default().encode());
    assert!(!out.output.contains("Settings Menu"), "reset renders no menu");
}

#[test]
#[should_panic(expected = "watchdog reset")]
fn reboot_control_never_returns() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    feed_all(&mut service, &mut store, &mut out, b"!");
}

// ── Silent drops ───────────────────────────────────────────────

#[test]
fn overflow_is_dropped_with_no_visible_effect() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    let before = service.settings().clone();
    out.clear_output();

    let outcome = feed_all(&mut service, &mut store, &mut out, b"P=123456");

    assert_eq!(outcome, CycleOutcome::Dropped(DropReason::Overflow));
    assert_eq!(service.settings(), &before);
    assert!(out.output.is_empty(), "overflow emits nothing");
}

#[test]
fn too_short_line_is_dropped_with_no_visible_effect() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    out.clear_output();

    let outcome = feed_all(&mut service, &mut store, &mut out, b"P=\r");

    assert_eq!(outcome, CycleOutcome::Dropped(DropReason::TooShort));
    assert!(out.output.is_empty(), "too-short emits nothing");
}

// ── Boot behaviour ─────────────────────────────────────────────

#[test]
fn boot_from_fresh_storage_reports_once_and_heals() {
    let mut store = MemStore::fresh();
    assert_eq!(store.read_byte(BASE_OFFSET), 0xFF);

    let mut out = BufferConsole::new();
    let service = boot(&mut store, &mut out);

    assert_eq!(service.settings(), &SettingsRecord::default());
    assert!(out.output.contains("Loading defaults"));
    assert_eq!(store.read_byte(BASE_OFFSET), SETTINGS_VERSION);

    // Second boot: healed image, no report.
    let mut out = BufferConsole::new();
    let service = boot(&mut store, &mut out);
    assert_eq!(service.settings(), &SettingsRecord::default());
    assert!(out.output.is_empty());
}

#[test]
fn last_input_timestamp_tracks_fed_bytes() {
    let mut store = MemStore::provisioned();
    let mut out = BufferConsole::new();
    let mut service = boot(&mut store, &mut out);
    let mut reset = PanicReset;

    assert_eq!(service.last_input_ms(), 0);
    let _ = service.feed(b'P', 1234, &mut store, &mut out, &mut reset);
    assert_eq!(service.last_input_ms(), 1234);
}
