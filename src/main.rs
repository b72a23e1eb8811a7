//! EtherPower settings console — main entry point.
//!
//! Hexagonal layout: the poll loop owns the adapters and threads them
//! through the domain core one byte at a time.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  SerialConsole      EepromAdapter      WatchdogReset     │
//! │  (ConsoleOut+RX)    (NonVolatileStore) (ResetPort)       │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │        ConsoleService (pure logic)             │      │
//! │  │  LineBuffer · SettingsRecord · MenuPresenter   │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use log::info;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config};
use esp_idf_hal::units::Hertz;

use etherpower::adapters::eeprom::EepromAdapter;
use etherpower::adapters::reset::WatchdogReset;
use etherpower::adapters::serial::SerialConsole;
use etherpower::app::service::ConsoleService;
use etherpower::drivers::watchdog::Watchdog;

/// Milliseconds since boot (monotonic).
fn now_ms() -> u64 {
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1000) as u64
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("EtherPower v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Construct adapters ─────────────────────────────────
    let peripherals = Peripherals::take()?;
    let uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &Config::new().baudrate(Hertz(115_200)),
    )?;
    let mut console = SerialConsole::new(uart);
    let mut eeprom = EepromAdapter::new()?;
    let mut reset = WatchdogReset;

    // ── 3. Load settings (heals incompatible images) ──────────
    let mut service = ConsoleService::boot(&mut eeprom, &mut console);

    // ── 4. Poll loop ──────────────────────────────────────────
    let watchdog = Watchdog::new();
    info!("console ready — send ? for the settings menu");

    loop {
        while let Some(byte) = console.poll_byte() {
            let _ = service.feed(byte, now_ms(), &mut eeprom, &mut console, &mut reset);
        }
        watchdog.feed();
        FreeRtos::delay_ms(10);
    }
}
