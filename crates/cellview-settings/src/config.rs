//! Configuration for CellView
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (server address, request timeout)
//! - Poller settings (retry cadence, load-wait budget)
//! - Panel settings (touch scale, dial and keypad images)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use cellview_core::constants::{
    LOAD_CHECK_INTERVAL_MS, LOAD_CHECK_LIMIT, REFRESH_TIMEOUT_MS, RETRY_INTERVAL_MS,
    TIMEOUT_BACKOFF, TOUCH_SCALE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for any single poller delay setting
const MAX_INTERVAL_MS: u64 = 60_000;
/// Upper bound for the timeout backoff multiplier
const MAX_TIMEOUT_BACKOFF: f64 = 10.0;

/// Connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Base URL of the live panel server
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl ConnectionSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8040".to_string(),
            request_timeout_ms: REFRESH_TIMEOUT_MS,
        }
    }
}

/// Screenshot poller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    pub retry_interval_ms: u64,
    pub timeout_backoff: f64,
    pub load_check_limit: u32,
    pub load_check_interval_ms: u64,
    /// Where the headless runner writes each downloaded screenshot
    pub screenshot_path: Option<PathBuf>,
}

impl PollerSettings {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn load_check_interval(&self) -> Duration {
        Duration::from_millis(self.load_check_interval_ms)
    }
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            retry_interval_ms: RETRY_INTERVAL_MS,
            timeout_backoff: TIMEOUT_BACKOFF,
            load_check_limit: LOAD_CHECK_LIMIT,
            load_check_interval_ms: LOAD_CHECK_INTERVAL_MS,
            screenshot_path: None,
        }
    }
}

/// A keypad button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSettings {
    /// Key value sent to the instrument
    pub id: String,
    /// Released image path
    pub image: String,
}

/// Panel layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub touch_scale: f64,
    pub dial_image: String,
    pub buttons: Vec<ButtonSettings>,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            touch_scale: TOUCH_SCALE,
            dial_image: "/static/img/dial1.png".to_string(),
            buttons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionSettings,
    pub poller: PollerSettings,
    pub panel: PanelSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into()),
    }
}

impl Config {
    /// Default config file location (`<config dir>/cellview/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })?;
        Ok(dir.join("cellview").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Config = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let base = &self.connection.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(SettingsError::invalid(
                "connection.base_url",
                "must start with http:// or https://",
            ));
        }

        if self.connection.request_timeout_ms == 0 {
            return Err(SettingsError::invalid(
                "connection.request_timeout_ms",
                "must be > 0",
            ));
        }

        if !(1..=MAX_INTERVAL_MS).contains(&self.poller.retry_interval_ms) {
            return Err(SettingsError::invalid(
                "poller.retry_interval_ms",
                format!("must be within 1..={}", MAX_INTERVAL_MS),
            ));
        }

        if !(self.poller.timeout_backoff.is_finite()
            && (1.0..=MAX_TIMEOUT_BACKOFF).contains(&self.poller.timeout_backoff))
        {
            return Err(ConfigError::ValueOutOfRange {
                key: "poller.timeout_backoff".to_string(),
                value: self.poller.timeout_backoff.to_string(),
            }
            .into());
        }

        if !(1..=MAX_INTERVAL_MS).contains(&self.poller.load_check_interval_ms) {
            return Err(SettingsError::invalid(
                "poller.load_check_interval_ms",
                format!("must be within 1..={}", MAX_INTERVAL_MS),
            ));
        }

        if !(self.panel.touch_scale.is_finite() && self.panel.touch_scale > 0.0) {
            return Err(ConfigError::ValueOutOfRange {
                key: "panel.touch_scale".to_string(),
                value: self.panel.touch_scale.to_string(),
            }
            .into());
        }

        if let Some(button) = self.panel.buttons.iter().find(|b| b.id.is_empty()) {
            return Err(SettingsError::invalid(
                "panel.buttons",
                format!("button with image '{}' has an empty id", button.image),
            ));
        }

        Ok(())
    }
}
