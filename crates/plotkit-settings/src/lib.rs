//! plotkit Settings Crate
//!
//! Handles pipeline configuration and settings persistence.

pub mod config;
pub mod error;

pub use config::{default_config_path, Config, OutputSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
