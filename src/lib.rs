//! FieldSense CLI library
//!
//! Exposes the configuration and command modules for integration testing.

pub mod cli;
pub mod config;

pub use config::{ConfigError, FieldSenseConfig};
