//! Task Watchdog Timer (TWDT) driver.
//!
//! Two uses:
//! - [`Watchdog`] guards the main poll loop — the loop must call
//!   `feed()` every iteration or the device resets after 10 seconds.
//! - [`force_reset`] is the deliberate reboot path: rearm the TWDT with
//!   a very short timeout and park until it fires.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms: 10_000,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed (10s timeout, panic on trigger)");
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op");
            Self {}
        }
    }

    /// Feed the watchdog. Must be called at least every 10 seconds.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}

/// Rearm the TWDT with `timeout_ms` and wait for it to fire.
///
/// Never returns: the watchdog expiry forces the hardware reset. On the
/// host this aborts the process, which is the closest observable
/// equivalent.
pub fn force_reset(timeout_ms: u32) -> ! {
    #[cfg(target_os = "espidf")]
    {
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let _ = esp_task_wdt_reconfigure(&cfg);
            let _ = esp_task_wdt_add(core::ptr::null_mut());
        }
        info!("Watchdog: forced reset armed ({timeout_ms} ms)");
        #[allow(clippy::empty_loop)]
        loop {
            // wait for it... boom
        }
    }

    #[cfg(not(target_os = "espidf"))]
    {
        log::info!("Watchdog(sim): forced reset ({timeout_ms} ms)");
        std::process::abort();
    }
}
