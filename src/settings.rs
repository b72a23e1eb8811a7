//! Versioned settings record mirrored to non-volatile storage.
//!
//! The persisted layout is a raw fixed-size image — contiguous, no
//! padding, no checksum:
//!
//! ```text
//! offset  0      1..5     5..9     9       10..16
//!         version address netmask  port    hardware identity
//! ```
//!
//! Byte 0 is the format version. Bump [`SETTINGS_VERSION`] whenever the
//! record shape changes; the mismatch forces a one-time default-reset on
//! next boot instead of a migration path.

use log::{info, warn};

use crate::app::ports::NonVolatileStore;
use crate::error::StorageIncompatible;

/// Compiled-in format version. Any stored image with a different version
/// byte is invalid in its entirety.
pub const SETTINGS_VERSION: u8 = 1;

/// Length of the serialized record image in bytes.
pub const IMAGE_LEN: usize = 16;

/// Fixed base offset of the image within the storage region.
pub const BASE_OFFSET: usize = 0;

/// Compiled-in defaults. The address and netmask depend on the local
/// network the controller ships into.
pub const DEFAULT_ADDRESS: [u8; 4] = [192, 168, 1, 177];
pub const DEFAULT_NETMASK: [u8; 4] = [255, 255, 255, 0];
pub const DEFAULT_PORT: u8 = 80;
pub const DEFAULT_IDENTITY: [u8; 6] = [0xDE, 0xAD, 0xBE, 0xEF, 0xFE, 0xED];

/// In-memory copy of the persisted configuration.
///
/// Mutated field-by-field only through the command dispatch table; every
/// write to storage serializes the full record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecord {
    pub version: u8,
    /// 4-byte network address of the embedded server.
    pub server_address: [u8; 4],
    /// 4-byte network mask.
    pub server_netmask: [u8; 4],
    /// Port selector. Port 80 is the HTTP default.
    pub server_port: u8,
    /// 6-byte link-layer (MAC) address.
    pub hardware_identity: [u8; 6],
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            server_address: DEFAULT_ADDRESS,
            server_netmask: DEFAULT_NETMASK,
            server_port: DEFAULT_PORT,
            hardware_identity: DEFAULT_IDENTITY,
        }
    }
}

/// What `load` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored image was compatible and in range.
    Loaded,
    /// Stored image was rejected; defaults were installed and persisted.
    DefaultsRestored(StorageIncompatible),
}

impl SettingsRecord {
    /// Serialize into the fixed byte image.
    pub fn encode(&self) -> [u8; IMAGE_LEN] {
        let mut image = [0u8; IMAGE_LEN];
        image[0] = self.version;
        image[1..5].copy_from_slice(&self.server_address);
        image[5..9].copy_from_slice(&self.server_netmask);
        image[9] = self.server_port;
        image[10..16].copy_from_slice(&self.hardware_identity);
        image
    }

    /// Rebuild a record from a stored image. Does not validate; callers
    /// run [`validate`](Self::validate) next.
    pub fn decode(image: &[u8; IMAGE_LEN]) -> Self {
        let mut server_address = [0u8; 4];
        let mut server_netmask = [0u8; 4];
        let mut hardware_identity = [0u8; 6];
        server_address.copy_from_slice(&image[1..5]);
        server_netmask.copy_from_slice(&image[5..9]);
        hardware_identity.copy_from_slice(&image[10..16]);
        Self {
            version: image[0],
            server_address,
            server_netmask,
            server_port: image[9],
            hardware_identity,
        }
    }

    /// Range-check every field. Any single failure invalidates the whole
    /// record; the error names the offending field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.version != SETTINGS_VERSION {
            return Err("version");
        }
        if self.server_address[0] == 0 || self.server_address[0] == 255 {
            return Err("server_address");
        }
        let inverted = !u32::from_be_bytes(self.server_netmask);
        if inverted & inverted.wrapping_add(1) != 0 {
            return Err("server_netmask");
        }
        if self.server_port == 0 {
            return Err("server_port");
        }
        // Multicast bit set means this cannot be a station address.
        if self.hardware_identity[0] & 0x01 != 0 {
            return Err("hardware_identity");
        }
        Ok(())
    }

    /// Read the record from storage, falling back to defaults.
    ///
    /// A version-byte mismatch skips the full-image read entirely; an
    /// out-of-range field after a full read is handled the same way. Both
    /// paths install the compiled-in defaults and persist them in the
    /// same call — atomic all-or-nothing recovery, reported once through
    /// the returned [`LoadOutcome`].
    pub fn load(store: &mut impl NonVolatileStore) -> (Self, LoadOutcome) {
        let found = store.read_byte(BASE_OFFSET);
        if found != SETTINGS_VERSION {
            return Self::restore_defaults(store, StorageIncompatible::VersionMismatch { found });
        }

        let mut image = [0u8; IMAGE_LEN];
        for (i, cell) in image.iter_mut().enumerate() {
            *cell = store.read_byte(BASE_OFFSET + i);
        }
        let record = Self::decode(&image);
        match record.validate() {
            Ok(()) => {
                info!("settings: loaded v{} image from storage", record.version);
                (record, LoadOutcome::Loaded)
            }
            Err(field) => {
                Self::restore_defaults(store, StorageIncompatible::FieldOutOfRange(field))
            }
        }
    }

    /// Serialize the full record and write it byte-by-byte starting at
    /// [`BASE_OFFSET`]. There is no partial-field persistence.
    pub fn persist(&self, store: &mut impl NonVolatileStore) {
        for (i, byte) in self.encode().iter().enumerate() {
            store.write_byte(BASE_OFFSET + i, *byte);
        }
    }

    /// Replace every field with the compiled-in defaults and persist.
    pub fn reset_to_defaults(&mut self, store: &mut impl NonVolatileStore) {
        *self = Self::default();
        self.persist(store);
        info!("settings: reset to defaults");
    }

    fn restore_defaults(
        store: &mut impl NonVolatileStore,
        reason: StorageIncompatible,
    ) -> (Self, LoadOutcome) {
        warn!("settings: {reason}, loading defaults");
        let defaults = Self::default();
        defaults.persist(store);
        (defaults, LoadOutcome::DefaultsRestored(reason))
    }
}
