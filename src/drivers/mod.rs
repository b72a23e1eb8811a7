//! Hardware drivers (ESP-IDF wrappers with host no-op fallbacks).

pub mod watchdog;
