//! EtherPower settings console firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod error;
pub mod line;
pub mod menu;
pub mod settings;

// Hardware-facing modules; implementations are guarded by cfg attributes
// inside, with host simulation backends for tests.
pub mod adapters;
pub mod drivers;
