//! Driven adapters: hardware (or simulation) implementations of the port
//! traits in [`crate::app::ports`].

pub mod eeprom;
pub mod reset;
pub mod serial;
