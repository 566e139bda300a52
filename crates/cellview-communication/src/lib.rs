//! # CellView Communication
//!
//! HTTP plumbing between the front panel and the instrument API.
//! Defines the endpoint contract, the `{success, data}` response envelope,
//! the traits the panel talks through, and a `reqwest` implementation.

pub mod api;
pub mod client;

pub use api::{
    screen_url, ApiResponse, CommandSink, ScreenApi, TouchPoint, KEYP_PATH, REFRESH_SCREEN_PATH,
    SCREEN_PATH, TOUCH_PATH,
};
pub use client::PanelClient;
