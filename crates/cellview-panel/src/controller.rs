//! Panel controller
//!
//! Binds the dial, keypad buttons and touch surface to a [`CommandSink`].
//! Input handlers update local widget state synchronously and queue the
//! resulting commands; a single worker task delivers them in order, so
//! two dial commands are never in flight at the same time. Delivery is
//! fire-and-forget: failures are logged and published as
//! `PanelEvent::CommandFailed`, never returned to the input handler.

use crate::dial::{DialTranslator, DialUpdate, Point, WheelDirection};
use crate::surface::{PanelButton, TouchSurface};
use cellview_communication::{CommandSink, TouchPoint};
use cellview_core::{EventDispatcher, PanelError, PanelEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A command waiting for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    KeyPress(String),
    Touch(TouchPoint),
}

impl std::fmt::Display for PanelCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelCommand::KeyPress(value) => write!(f, "keyp {}", value),
            PanelCommand::Touch(point) => write!(f, "touch {},{}", point.x, point.y),
        }
    }
}

/// Front panel input handling
pub struct PanelController {
    dial: DialTranslator,
    touch: TouchSurface,
    buttons: HashMap<String, PanelButton>,
    events: EventDispatcher,
    command_tx: mpsc::UnboundedSender<PanelCommand>,
    worker: JoinHandle<()>,
}

impl PanelController {
    /// Create a controller and start its delivery worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<S>(sink: Arc<S>, events: EventDispatcher, dial: DialTranslator, touch: TouchSurface) -> Self
    where
        S: CommandSink + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(deliver(sink, events.clone(), command_rx));
        Self {
            dial,
            touch,
            buttons: HashMap::new(),
            events,
            command_tx,
            worker,
        }
    }

    pub fn dial(&self) -> &DialTranslator {
        &self.dial
    }

    pub fn touch_surface(&self) -> &TouchSurface {
        &self.touch
    }

    pub fn add_button(&mut self, button: PanelButton) {
        self.buttons.insert(button.id().to_string(), button);
    }

    pub fn button(&self, id: &str) -> Option<&PanelButton> {
        self.buttons.get(id)
    }

    pub fn dial_press(&mut self) {
        self.dial.press();
    }

    pub fn dial_release(&mut self) {
        self.dial.release();
    }

    pub fn dial_focus_lost(&mut self) {
        self.dial.focus_lost();
    }

    /// Handle one wheel tick over the dial
    pub fn dial_wheel(&mut self, direction: WheelDirection) -> DialUpdate {
        let update = self.dial.wheel(direction);
        self.apply_dial_update(&update);
        update
    }

    /// Handle a motion sample over the dial
    pub fn dial_pointer_moved(
        &mut self,
        pointer: Point,
        center: Point,
    ) -> Result<Option<DialUpdate>, PanelError> {
        let update = self.dial.pointer_moved(pointer, center)?;
        if let Some(update) = &update {
            self.apply_dial_update(update);
        }
        Ok(update)
    }

    /// Handle a click on the screenshot
    pub fn tap(&mut self, page: Point, element_offset: Point) -> TouchPoint {
        let point = self.touch.to_device(page, element_offset);
        self.queue(PanelCommand::Touch(point));
        point
    }

    /// Pointer went down on a keypad button
    ///
    /// Returns false for an unknown button id.
    pub fn button_press(&mut self, id: &str) -> bool {
        let Some(button) = self.buttons.get_mut(id) else {
            tracing::warn!("Press on unknown button {}", id);
            return false;
        };
        let path = button.press();
        self.events.publish(PanelEvent::ButtonImageChanged {
            id: id.to_string(),
            path,
        });
        true
    }

    /// Pointer went up on a keypad button: restores its image and sends the key
    pub fn button_release(&mut self, id: &str) -> bool {
        let Some(button) = self.buttons.get_mut(id) else {
            return false;
        };
        let Some(key) = button.release() else {
            return false;
        };
        let path = button.current_image();
        self.events.publish(PanelEvent::ButtonImageChanged {
            id: id.to_string(),
            path,
        });
        self.queue(PanelCommand::KeyPress(key.value));
        true
    }

    /// Pointer left a held button: restores its image without sending
    pub fn button_cancel(&mut self, id: &str) {
        if let Some(button) = self.buttons.get_mut(id) {
            if button.cancel() {
                self.events.publish(PanelEvent::ButtonImageChanged {
                    id: id.to_string(),
                    path: button.current_image(),
                });
            }
        }
    }

    /// Stop accepting input and wait for queued commands to be delivered
    pub async fn shutdown(self) {
        drop(self.command_tx);
        if let Err(e) = self.worker.await {
            tracing::error!("Command worker ended abnormally: {}", e);
        }
    }

    fn apply_dial_update(&self, update: &DialUpdate) {
        self.events.publish(PanelEvent::DialImageChanged {
            path: update.image.clone(),
        });
        self.queue(PanelCommand::KeyPress(update.command.token().to_string()));
    }

    fn queue(&self, command: PanelCommand) {
        if self.command_tx.send(command).is_err() {
            tracing::error!("Command worker is gone; dropping command");
        }
    }
}

async fn deliver<S: CommandSink>(
    sink: Arc<S>,
    events: EventDispatcher,
    mut commands: mpsc::UnboundedReceiver<PanelCommand>,
) {
    while let Some(command) = commands.recv().await {
        let result = match &command {
            PanelCommand::KeyPress(value) => sink.key_press(value).await,
            PanelCommand::Touch(point) => sink.touch(*point).await,
        };
        let reason = match result {
            Ok(response) if response.success => {
                tracing::debug!("{} delivered: {}", command, response.data);
                continue;
            }
            Ok(response) => response.data,
            Err(e) => e.to_string(),
        };
        tracing::warn!("{} failed: {}", command, reason);
        events.publish(PanelEvent::CommandFailed {
            command: command.to_string(),
            reason,
        });
    }
    tracing::debug!("Command worker stopped");
}
