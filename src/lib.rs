//! # CellView
//!
//! Remote front panel for CellAdvisor instruments. The instrument's screen is
//! mirrored by polling screenshots over HTTP, and its rotary dial, keypad and
//! touch screen are driven by posting commands back.
//!
//! ## Architecture
//!
//! CellView is organized as a workspace with multiple crates:
//!
//! 1. **cellview-core** - Error types, panel events, protocol constants
//! 2. **cellview-communication** - HTTP endpoint contract and `reqwest` client
//! 3. **cellview-panel** - Dial translation, touch/keypad surface, screen poller
//! 4. **cellview-settings** - JSON/TOML configuration
//! 5. **cellview** - Headless host binary that ties the crates together

pub mod host;

pub use cellview_communication::{
    screen_url, ApiResponse, CommandSink, PanelClient, ScreenApi, TouchPoint,
};
pub use cellview_core::{ConnectionError, Error, EventDispatcher, PanelError, PanelEvent, Result};
pub use cellview_panel::{
    DialCommand, DialTranslator, LoadSignal, PanelButton, PanelController, PollerConfig,
    PollerStop, ScreenPoller, TouchSurface,
};
pub use cellview_settings::{Config, PanelSettings, PollerSettings};
pub use host::{ScreenFetcher, ScreenshotHost};

use std::sync::Arc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Poller timings from the `[poller]` config section
pub fn poller_config(settings: &PollerSettings) -> PollerConfig {
    PollerConfig {
        retry_interval: settings.retry_interval(),
        timeout_backoff: settings.timeout_backoff,
        load_check_limit: settings.load_check_limit,
        load_check_interval: settings.load_check_interval(),
    }
}

/// Build a panel controller laid out by the `[panel]` config section
///
/// Must be called from within a tokio runtime.
pub fn panel_controller<S>(
    sink: Arc<S>,
    events: EventDispatcher,
    settings: &PanelSettings,
) -> Result<PanelController>
where
    S: CommandSink + 'static,
{
    let touch = TouchSurface::new(settings.touch_scale)?;
    let dial = DialTranslator::new(&settings.dial_image);
    let mut controller = PanelController::new(sink, events, dial, touch);
    for button in &settings.buttons {
        controller.add_button(PanelButton::new(button.id.clone(), &button.image));
    }
    Ok(controller)
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
