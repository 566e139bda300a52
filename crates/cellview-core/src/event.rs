//! Event system for the front panel
//!
//! Provides:
//! - Event types the panel raises towards the hosting application
//! - Event dispatcher for publishing events to subscribers
//!
//! The host renders `Info` as inline status text, shows `Alert` as a
//! blocking notification and swaps image sources on the `*Changed` and
//! `ScreenUpdated` events.

use serde::Serialize;
use tokio::sync::broadcast;

/// Panel event types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum PanelEvent {
    /// Inline status text. An empty message clears the status line.
    Info(String),
    /// A fresh screenshot is available at `url`
    ScreenUpdated {
        /// Cache-busting screenshot address.
        url: String,
    },
    /// Blocking user notification
    Alert(String),
    /// The dial image must show a new sector
    DialImageChanged {
        /// New image path.
        path: String,
    },
    /// A keypad button image changed (pressed or released)
    ButtonImageChanged {
        /// Button identifier.
        id: String,
        /// New image path.
        path: String,
    },
    /// A fire-and-forget command could not be delivered
    CommandFailed {
        /// The command value or endpoint.
        command: String,
        /// Why it failed.
        reason: String,
    },
}

impl PanelEvent {
    /// Inline status event that clears any displayed message
    pub fn clear_info() -> Self {
        PanelEvent::Info(String::new())
    }

    /// Whether the host must interrupt the user for this event
    pub fn is_alert(&self) -> bool {
        matches!(self, PanelEvent::Alert(_))
    }
}

impl std::fmt::Display for PanelEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelEvent::Info(msg) if msg.is_empty() => write!(f, "Info cleared"),
            PanelEvent::Info(msg) => write!(f, "Info: {}", msg),
            PanelEvent::ScreenUpdated { url } => write!(f, "Screen updated: {}", url),
            PanelEvent::Alert(msg) => write!(f, "Alert: {}", msg),
            PanelEvent::DialImageChanged { path } => write!(f, "Dial image: {}", path),
            PanelEvent::ButtonImageChanged { id, path } => {
                write!(f, "Button {} image: {}", id, path)
            }
            PanelEvent::CommandFailed { command, reason } => {
                write!(f, "Command {} failed: {}", command, reason)
            }
        }
    }
}

/// Event dispatcher for publishing events to subscribers
#[derive(Clone)]
pub struct EventDispatcher {
    /// Broadcast sender channel for panel events.
    tx: broadcast::Sender<PanelEvent>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    ///
    /// # Arguments
    /// * `buffer_size` - Size of the broadcast buffer (default 100)
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Create a new event dispatcher with default buffer size
    pub fn default_with_buffer() -> Self {
        Self::new(100)
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of subscribers that received it. A panel with
    /// nobody listening keeps running, so a missing receiver is only traced.
    pub fn publish(&self, event: PanelEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!("No subscriber for panel event: {}", event);
                0
            }
        }
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::default_with_buffer()
    }
}
