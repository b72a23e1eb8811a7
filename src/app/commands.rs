//! Command line parsing and the key→setting dispatch table.
//!
//! A settings command has the shape `<key>=<digits>` (e.g. `P=80`). The
//! key is a single character; the value is scanned strictly — a non-digit
//! anywhere before the end of the line rejects the command rather than
//! truncating it. Values longer than [`VALUE_DIGITS_MAX`] digits are
//! capped, not rejected.
//!
//! Each table entry names the setting's valid range and where it lands in
//! the [`SettingsRecord`]; adding a setting is one new entry.

use crate::error::CommandError;
use crate::line::{LINE_CAPACITY, MIN_COMMAND_LEN};
use crate::settings::SettingsRecord;

/// Fixed width of the value field: digits past this are ignored.
pub const VALUE_DIGITS_MAX: usize = 5;

/// Parsed intent of one completed line. Lives only for the duration of
/// one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub key: u8,
    pub value: u32,
}

/// Parse a completed line into a [`Command`].
///
/// The caller (line buffer) guarantees `line.len() >= MIN_COMMAND_LEN`.
pub fn parse_line(line: &[u8]) -> Result<Command, CommandError> {
    debug_assert!(line.len() >= MIN_COMMAND_LEN);

    if line[1] != b'=' {
        return Err(CommandError::MalformedCommand);
    }

    let mut value: u32 = 0;
    for &byte in line[2..].iter().take(VALUE_DIGITS_MAX) {
        if !byte.is_ascii_digit() {
            return Err(CommandError::InvalidValue);
        }
        value = value * 10 + u32::from(byte - b'0');
    }

    Ok(Command {
        key: line[0],
        value,
    })
}

/// Echo a raw line for diagnostics, substituting non-printable bytes.
pub fn echo_line(line: &[u8]) -> heapless::String<LINE_CAPACITY> {
    let mut s = heapless::String::new();
    for &byte in line {
        let c = if byte.is_ascii_graphic() || byte == b' ' {
            byte as char
        } else {
            '.'
        };
        let _ = s.push(c);
    }
    s
}

// ───────────────────────────────────────────────────────────────
// Dispatch table
// ───────────────────────────────────────────────────────────────

/// Where a setting's value lands in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingTarget {
    /// One octet of the server address (index 0..4).
    AddressOctet(usize),
    /// Netmask as a prefix length, expanded to a 4-byte mask.
    NetmaskPrefix,
    /// Server port selector.
    Port,
    /// Last byte of the hardware identity (the upper five stay fixed).
    IdentityTail,
}

/// One row of the dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct SettingSpec {
    pub key: u8,
    pub label: &'static str,
    pub min: u32,
    pub max: u32,
    target: SettingTarget,
}

impl SettingSpec {
    /// Clamp `raw` into this setting's range and write it into `record`.
    pub fn apply(&self, record: &mut SettingsRecord, raw: u32) {
        let value = raw.clamp(self.min, self.max);
        match self.target {
            SettingTarget::AddressOctet(i) => record.server_address[i] = value as u8,
            SettingTarget::NetmaskPrefix => {
                record.server_netmask = prefix_to_mask(value as u8);
            }
            SettingTarget::Port => record.server_port = value as u8,
            SettingTarget::IdentityTail => record.hardware_identity[5] = value as u8,
        }
    }
}

/// Supported settings. Keys must not collide with the immediate controls
/// (`?`, `R`, `!`).
pub const SETTINGS_TABLE: &[SettingSpec] = &[
    SettingSpec {
        key: b'A',
        label: "server IP octet 1",
        min: 1,
        max: 254,
        target: SettingTarget::AddressOctet(0),
    },
    SettingSpec {
        key: b'B',
        label: "server IP octet 2",
        min: 0,
        max: 255,
        target: SettingTarget::AddressOctet(1),
    },
    SettingSpec {
        key: b'C',
        label: "server IP octet 3",
        min: 0,
        max: 255,
        target: SettingTarget::AddressOctet(2),
    },
    SettingSpec {
        key: b'D',
        label: "server IP octet 4",
        min: 0,
        max: 255,
        target: SettingTarget::AddressOctet(3),
    },
    SettingSpec {
        key: b'N',
        label: "netmask prefix length",
        min: 0,
        max: 32,
        target: SettingTarget::NetmaskPrefix,
    },
    SettingSpec {
        key: b'P',
        label: "server port",
        min: 1,
        max: 255,
        target: SettingTarget::Port,
    },
    SettingSpec {
        key: b'M',
        label: "MAC address last byte",
        min: 0,
        max: 255,
        target: SettingTarget::IdentityTail,
    },
];

/// Find the table row for `key`.
pub fn lookup(key: u8) -> Option<&'static SettingSpec> {
    SETTINGS_TABLE.iter().find(|spec| spec.key == key)
}

fn prefix_to_mask(prefix: u8) -> [u8; 4] {
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    };
    mask.to_be_bytes()
}
