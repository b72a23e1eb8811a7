//! Application core: port traits, command table, and the console service
//! that ties the line buffer to the settings record.

pub mod commands;
pub mod ports;
pub mod service;
