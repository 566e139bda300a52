//! # CellView Core
//!
//! Core types and utilities shared by the CellView crates.
//! Provides the error taxonomy, the panel event stream consumed by the
//! hosting application, and the default timings of the front panel.

pub mod constants;
pub mod error;
pub mod event;

pub use error::{ConnectionError, Error, PanelError, Result};
pub use event::{EventDispatcher, PanelEvent};
