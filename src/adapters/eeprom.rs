//! EEPROM-style byte region adapter.
//!
//! Implements [`NonVolatileStore`] for the settings image.
//!
//! The ESP32 has no EEPROM, so on ESP-IDF the region is shadowed in RAM
//! and flushed to a single NVS blob on every write; NVS commits are
//! atomic per `nvs_commit()`. The simulation backend is a bare cell
//! array. Both backends present fresh storage as all-`0xFF`, matching
//! erased EEPROM/flash, which is what makes the version-byte mismatch
//! path fire on first boot.

use crate::app::ports::NonVolatileStore;
use log::info;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::warn;

/// Emulated region size. Far larger than the settings image so the base
/// offset can move in later layouts without an adapter change.
pub const REGION_LEN: usize = 512;

#[cfg(target_os = "espidf")]
const NAMESPACE: &str = "etherpower";

#[cfg(target_os = "espidf")]
const REGION_KEY: &[u8] = b"eeprom\0";

pub struct EepromAdapter {
    shadow: [u8; REGION_LEN],
}

impl EepromAdapter {
    /// Create the adapter and initialise the backing storage.
    ///
    /// On ESP-IDF this initialises NVS flash (erasing and retrying once
    /// on a layout/version problem, as the IDF docs prescribe) and pulls
    /// the existing region blob into the RAM shadow.
    pub fn new() -> anyhow::Result<Self> {
        #[cfg(target_os = "espidf")]
        {
            let mut shadow = [0xFF_u8; REGION_LEN];

            // SAFETY: nvs_flash_init / nvs_flash_erase run from the single
            // main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("EepromAdapter: erasing and re-initialising NVS partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK {
                    anyhow::bail!("NVS erase failed ({ret2})");
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK {
                    anyhow::bail!("NVS re-init failed ({ret3})");
                }
            } else if ret != ESP_OK {
                anyhow::bail!("NVS init failed ({ret})");
            }

            if let Ok(len) = Self::read_region_blob(&mut shadow) {
                info!("EepromAdapter: pulled {len} bytes from NVS");
            } else {
                info!("EepromAdapter: no stored region, presenting fresh 0xFF cells");
            }

            Ok(Self { shadow })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("EepromAdapter: simulation backend ({REGION_LEN} cells)");
            Ok(Self {
                shadow: [0xFF_u8; REGION_LEN],
            })
        }
    }

    /// Open the NVS namespace, run a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_region_blob(shadow: &mut [u8; REGION_LEN]) -> Result<usize, i32> {
        Self::with_nvs_handle(false, |handle| {
            let mut size = REGION_LEN;
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    REGION_KEY.as_ptr() as *const _,
                    shadow.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(size)
        })
    }

    #[cfg(target_os = "espidf")]
    fn flush_region_blob(&self) {
        let result = Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    REGION_KEY.as_ptr() as *const _,
                    self.shadow.as_ptr() as *const _,
                    self.shadow.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        if let Err(e) = result {
            // The store port is infallible by contract; a failing flash
            // device leaves the RAM shadow authoritative until reboot.
            warn!("EepromAdapter: NVS flush error {e}");
        }
    }
}

impl NonVolatileStore for EepromAdapter {
    fn read_byte(&self, offset: usize) -> u8 {
        self.shadow[offset]
    }

    fn write_byte(&mut self, offset: usize, value: u8) {
        self.shadow[offset] = value;
        #[cfg(target_os = "espidf")]
        self.flush_region_blob();
    }

    fn capacity(&self) -> usize {
        REGION_LEN
    }
}
