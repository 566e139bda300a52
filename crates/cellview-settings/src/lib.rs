//! CellView Settings Crate
//!
//! Handles application configuration: connection target, poller timings
//! and panel layout, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{ButtonSettings, Config, ConnectionSettings, PanelSettings, PollerSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
