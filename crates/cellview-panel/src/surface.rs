//! Touch screen and keypad surfaces
//!
//! Both are stateless relays: a tap becomes a device-space touch, a button
//! click becomes a key press. Buttons additionally show a pressed image
//! while held down.

use crate::dial::Point;
use crate::image_path::{pressed_image, released_image};
use cellview_communication::TouchPoint;
use cellview_core::constants::TOUCH_SCALE;
use cellview_core::PanelError;

/// Screenshot area that forwards taps to the instrument's touch screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSurface {
    scale: f64,
}

impl TouchSurface {
    /// Surface scaling display pixels by `scale` into device pixels
    pub fn new(scale: f64) -> Result<Self, PanelError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PanelError::InvalidScale { scale });
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Convert a page position into device coordinates
    ///
    /// `element_offset` is the page position of the surface's top-left
    /// corner. Fractions are truncated toward zero.
    pub fn to_device(&self, page: Point, element_offset: Point) -> TouchPoint {
        let x = (page.x - element_offset.x) * self.scale;
        let y = (page.y - element_offset.y) * self.scale;
        TouchPoint::new(x.trunc() as i32, y.trunc() as i32)
    }
}

impl Default for TouchSurface {
    fn default() -> Self {
        Self { scale: TOUCH_SCALE }
    }
}

/// Key value to send for a button click
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub value: String,
}

/// A keypad button with released and pressed images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelButton {
    id: String,
    image: String,
    pressed: bool,
}

impl PanelButton {
    /// Button sending `id` as its key value, showing `image` when released
    pub fn new(id: impl Into<String>, image: &str) -> Self {
        Self {
            id: id.into(),
            image: released_image(image),
            pressed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Image currently displayed
    pub fn current_image(&self) -> String {
        if self.pressed {
            pressed_image(&self.image)
        } else {
            self.image.clone()
        }
    }

    /// Pointer went down: returns the pressed image
    pub fn press(&mut self) -> String {
        self.pressed = true;
        self.current_image()
    }

    /// Pointer went up over the button: completes the click
    ///
    /// Returns the key press when the button was held, `None` otherwise.
    pub fn release(&mut self) -> Option<KeyPress> {
        if !std::mem::take(&mut self.pressed) {
            return None;
        }
        Some(KeyPress {
            value: self.id.clone(),
        })
    }

    /// Pointer left the button while held: restore without clicking
    pub fn cancel(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }
}
