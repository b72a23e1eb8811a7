//! Error types for the settings console.
//!
//! Every recoverable failure is a typed variant so callers handle each
//! case explicitly. All variants leave the in-memory settings record
//! untouched and return the line buffer to empty; none are retried and
//! none abort the firmware.

use core::fmt;

use crate::line::LINE_CAPACITY;

/// Failures while interpreting a completed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The `=` separator is missing at position 1.
    MalformedCommand,
    /// A non-digit appeared in the value field before the line ended.
    InvalidValue,
    /// The key character maps to no known setting. Carries the offending
    /// line for diagnostic echo.
    UnknownCommand(heapless::String<LINE_CAPACITY>),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCommand => write!(f, "Missing '=' in command"),
            Self::InvalidValue => write!(f, "Invalid setting value"),
            Self::UnknownCommand(line) => write!(f, "Command Error: {line}"),
        }
    }
}

/// Why a persisted settings image was rejected at load time.
///
/// Either way the whole record is invalid — there is no partial
/// migration. Recovery installs compiled-in defaults and re-persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageIncompatible {
    /// Stored version byte does not match [`crate::settings::SETTINGS_VERSION`].
    VersionMismatch { found: u8 },
    /// A field of the stored image is outside its declared valid range.
    FieldOutOfRange(&'static str),
}

impl fmt::Display for StorageIncompatible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionMismatch { found } => {
                write!(f, "settings version mismatch (found {found})")
            }
            Self::FieldOutOfRange(field) => write!(f, "setting out of range: {field}"),
        }
    }
}
