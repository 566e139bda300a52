//! # CellView Panel
//!
//! Front panel behaviour, independent of any windowing toolkit:
//! - **dial** - rotary dial gesture translation and command emission
//! - **image_path** - sector and pressed-state image naming
//! - **surface** - touch screen taps and keypad buttons
//! - **poller** - screenshot refresh loop with timeout and load-wait retries
//!
//! The hosting application feeds input events in and renders the
//! [`cellview_core::PanelEvent`]s published by these components.

pub mod controller;
pub mod dial;
pub mod image_path;
pub mod poller;
pub mod surface;

pub use controller::{PanelCommand, PanelController};
pub use dial::{
    pointer_angle, DialCommand, DialTranslator, DialUpdate, GestureSession, Orientation, Point,
    Sector, WheelDirection,
};
pub use image_path::{pressed_image, released_image, sector_image};
pub use poller::{LoadSignal, LoadWait, PollerConfig, PollerStop, RefreshOutcome, ScreenPoller};
pub use surface::{KeyPress, PanelButton, TouchSurface};
