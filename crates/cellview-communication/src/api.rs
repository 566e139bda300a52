//! Instrument API contract
//!
//! The server exposes four endpoints under `/api`. Every JSON answer is
//! wrapped in a `{success, data}` envelope; the screenshot itself is served
//! as a JPEG and addressed with a `date` query parameter that defeats
//! browser and proxy caches.

use async_trait::async_trait;
use cellview_core::Result;
use serde::{Deserialize, Serialize};

/// Triggers a server-side screenshot capture
pub const REFRESH_SCREEN_PATH: &str = "/api/screen/refresh_screen";
/// Serves the last captured screenshot
pub const SCREEN_PATH: &str = "/api/screen/screen";
/// Taps the instrument's touch screen
pub const TOUCH_PATH: &str = "/api/scpi/touch";
/// Presses a front panel key
pub const KEYP_PATH: &str = "/api/scpi/keyp";

/// Response envelope returned by every JSON endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the server-side operation succeeded
    pub success: bool,
    /// Human readable detail, or the error message when `success` is false
    #[serde(default, deserialize_with = "data_as_string")]
    pub data: String,
}

impl ApiResponse {
    /// Successful response carrying `data`
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: data.into(),
        }
    }

    /// Failed response carrying an error message
    pub fn failed(data: impl Into<String>) -> Self {
        Self {
            success: false,
            data: data.into(),
        }
    }
}

// `data` is usually a string, but some commands answer with structured JSON.
fn data_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// A tap position in device coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: i32,
    pub y: i32,
}

impl TouchPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Address of the current screenshot, made unique by `timestamp_ms`
pub fn screen_url(timestamp_ms: i64) -> String {
    format!("{}?date={}", SCREEN_PATH, timestamp_ms)
}

/// Screenshot refresh side of the API
#[async_trait]
pub trait ScreenApi: Send + Sync {
    /// Ask the server to capture a fresh screenshot
    ///
    /// A request that exceeds its deadline must fail with
    /// `ConnectionError::ConnectionTimeout` so callers can tell it apart
    /// from other transport failures.
    async fn refresh_screen(&self) -> Result<ApiResponse>;
}

/// Command side of the API
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Tap the touch screen at a device position
    async fn touch(&self, point: TouchPoint) -> Result<ApiResponse>;

    /// Press a key; `value` is a button identifier or a dial token
    async fn key_press(&self, value: &str) -> Result<ApiResponse>;
}
