//! Text inputs driven by the on-screen keyboard.
//!
//! [`VirtualLineEdit`] and [`VirtualTextEdit`] wrap a toolkit text control,
//! subscribe to the key event bus and apply every [`KeyId`] they receive,
//! provided they have focus (or have opted out of needing it).  They are
//! virtual-only: hardware key presses reaching them through the normal focus
//! path are refused.
//!
//! | Key         | Line edit                    | Text edit                    |
//! |-------------|------------------------------|------------------------------|
//! | text        | insert at cursor             | insert at cursor             |
//! | `backspace` | delete selection or one char | delete selection or one char |
//! | `return`    | nothing                      | append an empty paragraph    |

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;
use vkbd_core::KeyId;

use super::broadcast::Subscription;
use super::services::{ConfigurationError, Services};
use crate::infrastructure::toolkit::{
    KeyInput, PhysicalKeyEvent, TextControl, Toolkit, Widget, WidgetId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lines {
    Single,
    Multi,
}

/// State shared between an input and its bus handler.
struct InputState {
    control: Rc<dyn TextControl>,
    lines: Lines,
    requires_focus: Cell<bool>,
}

impl InputState {
    fn apply(&self, key: &KeyId) {
        if self.requires_focus.get() && !self.control.has_focus() {
            return;
        }
        match key {
            KeyId::Backspace => {
                if !self.control.remove_selected_text() {
                    self.control.delete_previous_char();
                }
            }
            KeyId::Return => match self.lines {
                Lines::Single => {}
                Lines::Multi => self.control.append_paragraph(""),
            },
            KeyId::Text(text) => self.control.insert(text),
        }
    }
}

/// Shared plumbing of both input kinds.
struct VirtualInput {
    state: Rc<InputState>,
    _subscription: Subscription,
}

impl VirtualInput {
    fn new(
        services: &Services,
        control: Rc<dyn TextControl>,
        lines: Lines,
    ) -> Result<Self, ConfigurationError> {
        let bus = services.key_bus()?;
        let state = Rc::new(InputState {
            control,
            lines,
            requires_focus: Cell::new(true),
        });
        let handler_state = Rc::clone(&state);
        let subscription = bus.subscribe(move |key| handler_state.apply(key));
        Ok(Self {
            state,
            _subscription: subscription,
        })
    }

    fn reject(&self, event: &mut PhysicalKeyEvent) {
        event.ignore();
        trace!(
            widget = %self.state.control.widget_id(),
            key = ?event.key,
            "virtual input refused physical key"
        );
    }
}

/// A single-line input fed by the key event bus.
pub struct VirtualLineEdit {
    inner: VirtualInput,
}

impl VirtualLineEdit {
    /// Creates a line edit on a fresh toolkit control.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::MissingService`] if no key event bus is
    /// installed.
    pub fn new(
        services: &Services,
        toolkit: &dyn Toolkit,
    ) -> Result<Rc<Self>, ConfigurationError> {
        Self::with_control(services, toolkit.create_line_edit())
    }

    /// Wraps an existing single-line control.
    pub fn with_control(
        services: &Services,
        control: Rc<dyn TextControl>,
    ) -> Result<Rc<Self>, ConfigurationError> {
        Ok(Rc::new(Self {
            inner: VirtualInput::new(services, control, Lines::Single)?,
        }))
    }

    /// When `false`, keys are applied even without focus.
    pub fn set_requires_focus(&self, requires_focus: bool) {
        self.inner.state.requires_focus.set(requires_focus);
    }

    pub fn requires_focus(&self) -> bool {
        self.inner.state.requires_focus.get()
    }

    /// The wrapped toolkit control.
    pub fn control(&self) -> Rc<dyn TextControl> {
        Rc::clone(&self.inner.state.control)
    }

    pub fn text(&self) -> String {
        self.inner.state.control.text()
    }
}

impl Widget for VirtualLineEdit {
    fn widget_id(&self) -> WidgetId {
        self.inner.state.control.widget_id()
    }

    fn key_input(&self) -> Option<&dyn KeyInput> {
        Some(self)
    }
}

impl KeyInput for VirtualLineEdit {
    fn is_virtual_only(&self) -> bool {
        true
    }

    fn key_press_event(&self, event: &mut PhysicalKeyEvent) {
        self.inner.reject(event);
    }
}

/// A multi-line input fed by the key event bus.
pub struct VirtualTextEdit {
    inner: VirtualInput,
}

impl VirtualTextEdit {
    /// Creates a text edit on a fresh toolkit control.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::MissingService`] if no key event bus is
    /// installed.
    pub fn new(
        services: &Services,
        toolkit: &dyn Toolkit,
    ) -> Result<Rc<Self>, ConfigurationError> {
        Self::with_control(services, toolkit.create_text_edit())
    }

    /// Wraps an existing multi-line control.
    pub fn with_control(
        services: &Services,
        control: Rc<dyn TextControl>,
    ) -> Result<Rc<Self>, ConfigurationError> {
        Ok(Rc::new(Self {
            inner: VirtualInput::new(services, control, Lines::Multi)?,
        }))
    }

    pub fn set_requires_focus(&self, requires_focus: bool) {
        self.inner.state.requires_focus.set(requires_focus);
    }

    pub fn requires_focus(&self) -> bool {
        self.inner.state.requires_focus.get()
    }

    pub fn control(&self) -> Rc<dyn TextControl> {
        Rc::clone(&self.inner.state.control)
    }

    pub fn text(&self) -> String {
        self.inner.state.control.text()
    }
}

impl Widget for VirtualTextEdit {
    fn widget_id(&self) -> WidgetId {
        self.inner.state.control.widget_id()
    }

    fn key_input(&self) -> Option<&dyn KeyInput> {
        Some(self)
    }
}

impl KeyInput for VirtualTextEdit {
    fn is_virtual_only(&self) -> bool {
        true
    }

    fn key_press_event(&self, event: &mut PhysicalKeyEvent) {
        self.inner.reject(event);
    }
}
