//! Host UI toolkit ports.
//!
//! The keyboard engine never talks to a windowing system directly.  Everything
//! it needs from the host (buttons, stacked pages, text inputs, a focus query
//! and a window-level key hook) is expressed as a trait here.  A real
//! integration implements these traits on top of its widget set; the
//! [`headless`] module implements them in memory for tests and the demo.
//!
//! # Threading
//!
//! Every trait here is used from the UI thread only.  Handles are `Rc`, not
//! `Arc`, and nothing is `Send`.

use std::rc::Rc;

use uuid::Uuid;
use vkbd_core::{KeyIcon, PhysicalKey};

pub mod headless;

/// Identity of a widget, stable for its lifetime.
pub type WidgetId = Uuid;

/// Window-level hook installed by a keyboard grab.
pub type KeyHook = Box<dyn FnMut(&mut PhysicalKeyEvent)>;

/// A raw hardware key press delivered by the host window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalKeyEvent {
    /// The key that was pressed.
    pub key: PhysicalKey,
    /// The text the key produces; may contain control characters
    /// (`"\r"` for Enter, `"\u{8}"` for Backspace) or be empty (modifiers).
    pub text: String,
    accepted: bool,
}

impl PhysicalKeyEvent {
    /// A key press producing `text` (letters, digits, punctuation).
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            key: PhysicalKey::Character,
            text: text.into(),
            accepted: false,
        }
    }

    /// A press of a named key, with the text the host would attach to it.
    pub fn named(key: PhysicalKey) -> Self {
        let text = match key {
            PhysicalKey::Backspace => "\u{8}",
            PhysicalKey::Enter => "\r",
            PhysicalKey::Tab => "\t",
            PhysicalKey::Escape => "\u{1b}",
            PhysicalKey::Delete => "\u{7f}",
            _ => "",
        };
        Self {
            key,
            text: text.to_string(),
            accepted: false,
        }
    }

    /// Marks the event handled; the host stops propagating it.
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    /// Marks the event unhandled; the host may propagate it to the parent.
    pub fn ignore(&mut self) {
        self.accepted = false;
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }
}

/// Capability of widgets that take key presses through the normal focus path.
pub trait KeyInput {
    /// `true` for inputs fed exclusively by the key event bus.
    ///
    /// The physical key interceptor never forwards to such inputs.
    fn is_virtual_only(&self) -> bool;

    /// Handles a physical key press delivered to the focused widget.
    fn key_press_event(&self, event: &mut PhysicalKeyEvent);
}

/// Anything that can hold input focus.
pub trait Widget {
    fn widget_id(&self) -> WidgetId;

    /// Key-handling capability, if the widget has one.
    fn key_input(&self) -> Option<&dyn KeyInput> {
        None
    }
}

/// A pressable button showing either text or an icon.
pub trait ButtonControl {
    fn widget_id(&self) -> WidgetId;
    /// Name stylesheets select on.
    fn set_object_name(&self, name: &str);
    fn object_name(&self) -> String;
    fn set_text(&self, text: &str);
    fn set_icon(&self, icon: KeyIcon);
    /// Whether the button may take keyboard focus.
    fn set_focusable(&self, focusable: bool);
    fn is_focusable(&self) -> bool;
    /// Natural minimum width for the current face, in pixels.
    fn minimum_width(&self) -> u32;
    fn set_fixed_size(&self, width: u32, height: u32);
    /// Current `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);
    fn connect_clicked(&self, handler: Box<dyn Fn()>);
    /// Activates the button as if it had been clicked.
    fn click(&self);
}

/// Incrementally lays out one page: rows of buttons, spacing and stretch.
pub trait PageBuilder {
    /// Starts a new row below the previous one.
    fn begin_row(&mut self);
    /// Adds flexible space that absorbs leftover width.
    fn add_stretch(&mut self);
    /// Adds fixed blank space.
    fn add_spacing(&mut self, width: u32);
    fn add_button(&mut self, button: Rc<dyn ButtonControl>);
    fn finish(self: Box<Self>) -> Rc<dyn PageView>;
}

/// A built page.
pub trait PageView {
    fn set_visible(&self, visible: bool);
    fn is_visible(&self) -> bool;
}

/// A container showing exactly one of its pages at a time.
pub trait StackControl {
    /// Appends a page and returns its index.  The first page becomes current.
    fn add_page(&self, page: Rc<dyn PageView>) -> usize;
    /// Shows the page at `index` and hides the others; out-of-range is ignored.
    fn set_current_index(&self, index: usize);
    fn current_index(&self) -> Option<usize>;
    fn count(&self) -> usize;
}

/// A single- or multi-line text entry control.
pub trait TextControl: Widget {
    fn text(&self) -> String;
    fn has_focus(&self) -> bool;
    fn is_multi_line(&self) -> bool;
    fn cursor_position(&self) -> usize;
    fn has_selection(&self) -> bool;
    /// Selects `[start, end)` in chars.
    fn select(&self, start: usize, end: usize);
    /// Inserts at the cursor, replacing the selection.
    fn insert(&self, text: &str);
    /// Returns `false` when nothing was selected.
    fn remove_selected_text(&self) -> bool;
    /// Returns `false` at the start of the text.
    fn delete_previous_char(&self) -> bool;
    /// Appends a paragraph at the end (multi-line only).
    fn append_paragraph(&self, text: &str);
    fn set_placeholder_text(&self, text: &str);
    /// This control as a plain widget, e.g. to give it focus.
    fn into_widget(self: Rc<Self>) -> Rc<dyn Widget>;
}

/// A top-level window.
pub trait HostWindow {
    /// The widget that currently has input focus.
    fn focus_widget(&self) -> Option<Rc<dyn Widget>>;

    /// Grabs the keyboard: every key press reaches `hook` before (and instead
    /// of) focus-based delivery.
    fn grab_keyboard(&self, hook: KeyHook);
}

/// Factory for the controls the keyboard engine builds.
pub trait Toolkit {
    fn create_button(&self) -> Rc<dyn ButtonControl>;
    fn create_page_builder(&self) -> Box<dyn PageBuilder>;
    fn create_stack(&self) -> Rc<dyn StackControl>;
    fn create_line_edit(&self) -> Rc<dyn TextControl>;
    fn create_text_edit(&self) -> Rc<dyn TextControl>;
}
