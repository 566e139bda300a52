//! Front panel defaults
//!
//! Timings, geometry and user-facing messages of the live panel.

/// Base retry interval between refresh cycles (ms)
pub const RETRY_INTERVAL_MS: u64 = 100;

/// Multiplier applied to the retry interval after a refresh timeout
pub const TIMEOUT_BACKOFF: f64 = 1.5;

/// Deadline for a single refresh request (ms)
pub const REFRESH_TIMEOUT_MS: u64 = 8000;

/// Number of load-status checks before giving up on a screenshot
pub const LOAD_CHECK_LIMIT: u32 = 40;

/// Spacing between load-status checks (ms)
pub const LOAD_CHECK_INTERVAL_MS: u64 = 400;

/// Display-to-device coordinate ratio for touch taps
pub const TOUCH_SCALE: f64 = 1.33;

/// Number of dial sectors
pub const SECTOR_COUNT: u8 = 12;

/// Width of one dial sector in degrees
pub const SECTOR_DEGREES: f64 = 360.0 / SECTOR_COUNT as f64;

/// Key value sent when the dial turns clockwise
pub const DIAL_RIGHT_TOKEN: &str = "DIAL:RIGH";

/// Key value sent when the dial turns counter-clockwise
pub const DIAL_LEFT_TOKEN: &str = "DIAL:LEFT";

/// Suffix inserted before the extension of a pressed button image
pub const PRESSED_SUFFIX: &str = "_d";

pub const MSG_POOR_NETWORK: &str = "Poor network connection";
pub const MSG_CONNECTION_FAILED: &str = "Connection failed, Try again:";
pub const MSG_CHECK_NETWORK: &str = "Check your network connection!";
pub const MSG_REFRESH_FAILED: &str = "Refresh Screenshot failed, ";
