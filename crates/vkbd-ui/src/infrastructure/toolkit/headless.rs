//! In-memory implementation of the toolkit ports.
//!
//! Nothing is drawn.  Buttons remember their face and size, pages remember
//! their row structure, text controls are backed by an [`EditBuffer`], and a
//! [`HeadlessWindow`] tracks focus and delivers synthetic key presses.  The
//! demo binary and the test suites drive the keyboard engine through it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;
use uuid::Uuid;
use vkbd_core::keys::physical::printable_text;
use vkbd_core::{EditBuffer, KeyIcon, PhysicalKey};

use super::{
    ButtonControl, HostWindow, KeyHook, KeyInput, PageBuilder, PageView, PhysicalKeyEvent,
    StackControl, TextControl, Toolkit, Widget, WidgetId,
};

/// Approximate pixel width of one character of button text.
const CHAR_WIDTH: u32 = 8;
/// Pixel width of an icon face.
const ICON_WIDTH: u32 = 24;
/// Horizontal padding around a button face.
const BUTTON_PADDING: u32 = 12;

/// Which widget holds focus, shared by a toolkit and its windows.
type FocusTracker = Rc<Cell<Option<WidgetId>>>;

// ── Toolkit ──────────────────────────────────────────────────────────────────

/// Headless widget factory.
#[derive(Default)]
pub struct HeadlessToolkit {
    focus: FocusTracker,
    pages: Rc<RefCell<Vec<Rc<HeadlessPage>>>>,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a window sharing this toolkit's focus tracking.
    pub fn create_window(&self) -> Rc<HeadlessWindow> {
        Rc::new(HeadlessWindow {
            focus: Rc::clone(&self.focus),
            focused: RefCell::new(None),
            hook: RefCell::new(None),
        })
    }

    /// Every page built so far, in build order.
    pub fn built_pages(&self) -> Vec<Rc<HeadlessPage>> {
        self.pages.borrow().clone()
    }
}

impl Toolkit for HeadlessToolkit {
    fn create_button(&self) -> Rc<dyn ButtonControl> {
        Rc::new(HeadlessButton::new())
    }

    fn create_page_builder(&self) -> Box<dyn PageBuilder> {
        Box::new(HeadlessPageBuilder {
            rows: Vec::new(),
            log: Rc::clone(&self.pages),
        })
    }

    fn create_stack(&self) -> Rc<dyn StackControl> {
        Rc::new(HeadlessStack::default())
    }

    fn create_line_edit(&self) -> Rc<dyn TextControl> {
        Rc::new(HeadlessTextInput::new(
            EditBuffer::single_line(),
            Rc::clone(&self.focus),
        ))
    }

    fn create_text_edit(&self) -> Rc<dyn TextControl> {
        Rc::new(HeadlessTextInput::new(
            EditBuffer::multi_line(),
            Rc::clone(&self.focus),
        ))
    }
}

// ── Button ───────────────────────────────────────────────────────────────────

/// What a button currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ButtonFace {
    Blank,
    Text(String),
    Icon(KeyIcon),
}

/// A button recording its face, size and click handlers.
pub struct HeadlessButton {
    id: WidgetId,
    object_name: RefCell<String>,
    face: RefCell<ButtonFace>,
    focusable: Cell<bool>,
    size: Cell<(u32, u32)>,
    handlers: RefCell<Vec<Rc<dyn Fn()>>>,
}

impl HeadlessButton {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            object_name: RefCell::new(String::new()),
            face: RefCell::new(ButtonFace::Blank),
            focusable: Cell::new(true),
            size: Cell::new((0, 0)),
            handlers: RefCell::new(Vec::new()),
        }
    }
}

impl ButtonControl for HeadlessButton {
    fn widget_id(&self) -> WidgetId {
        self.id
    }

    fn set_object_name(&self, name: &str) {
        *self.object_name.borrow_mut() = name.to_string();
    }

    fn object_name(&self) -> String {
        self.object_name.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.face.borrow_mut() = ButtonFace::Text(text.to_string());
    }

    fn set_icon(&self, icon: KeyIcon) {
        *self.face.borrow_mut() = ButtonFace::Icon(icon);
    }

    fn set_focusable(&self, focusable: bool) {
        self.focusable.set(focusable);
    }

    fn is_focusable(&self) -> bool {
        self.focusable.get()
    }

    fn minimum_width(&self) -> u32 {
        let content = match &*self.face.borrow() {
            ButtonFace::Blank => 0,
            // A doubled "&&" renders as a single ampersand.
            ButtonFace::Text(text) => {
                text.replace("&&", "&").chars().count() as u32 * CHAR_WIDTH
            }
            ButtonFace::Icon(_) => ICON_WIDTH,
        };
        content + BUTTON_PADDING
    }

    fn set_fixed_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }

    fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn connect_clicked(&self, handler: Box<dyn Fn()>) {
        self.handlers.borrow_mut().push(Rc::from(handler));
    }

    fn click(&self) {
        // Handlers may rebuild pages; never hold the borrow while calling out.
        let handlers = self.handlers.borrow().clone();
        for handler in handlers {
            handler();
        }
    }
}

// ── Pages ────────────────────────────────────────────────────────────────────

/// One laid-out item of a row.
#[derive(Clone)]
pub enum RowItem {
    Stretch,
    Spacing(u32),
    Button(Rc<dyn ButtonControl>),
}

impl std::fmt::Debug for RowItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stretch => write!(f, "Stretch"),
            Self::Spacing(width) => write!(f, "Spacing({width})"),
            Self::Button(button) => write!(f, "Button({:?})", button.size()),
        }
    }
}

pub struct HeadlessPage {
    rows: Vec<Vec<RowItem>>,
    visible: Cell<bool>,
}

impl HeadlessPage {
    pub fn rows(&self) -> &[Vec<RowItem>] {
        &self.rows
    }

    /// Total fixed width of a row: button widths plus spacing, saturating.
    pub fn row_width(&self, row: usize) -> u32 {
        self.rows.get(row).map_or(0, |items| {
            items
                .iter()
                .map(|item| match item {
                    RowItem::Stretch => 0,
                    RowItem::Spacing(width) => *width,
                    RowItem::Button(button) => button.size().0,
                })
                .fold(0, u32::saturating_add)
        })
    }
}

impl PageView for HeadlessPage {
    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }
}

struct HeadlessPageBuilder {
    rows: Vec<Vec<RowItem>>,
    log: Rc<RefCell<Vec<Rc<HeadlessPage>>>>,
}

impl HeadlessPageBuilder {
    fn current_row(&mut self) -> &mut Vec<RowItem> {
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }
}

impl PageBuilder for HeadlessPageBuilder {
    fn begin_row(&mut self) {
        self.rows.push(Vec::new());
    }

    fn add_stretch(&mut self) {
        self.current_row().push(RowItem::Stretch);
    }

    fn add_spacing(&mut self, width: u32) {
        self.current_row().push(RowItem::Spacing(width));
    }

    fn add_button(&mut self, button: Rc<dyn ButtonControl>) {
        self.current_row().push(RowItem::Button(button));
    }

    fn finish(self: Box<Self>) -> Rc<dyn PageView> {
        let page = Rc::new(HeadlessPage {
            rows: self.rows,
            visible: Cell::new(false),
        });
        self.log.borrow_mut().push(Rc::clone(&page));
        page
    }
}

#[derive(Default)]
pub struct HeadlessStack {
    pages: RefCell<Vec<Rc<dyn PageView>>>,
    current: Cell<Option<usize>>,
}

impl StackControl for HeadlessStack {
    fn add_page(&self, page: Rc<dyn PageView>) -> usize {
        let mut pages = self.pages.borrow_mut();
        let index = pages.len();
        let first = self.current.get().is_none();
        page.set_visible(first);
        pages.push(page);
        if first {
            self.current.set(Some(index));
        }
        index
    }

    fn set_current_index(&self, index: usize) {
        let pages = self.pages.borrow();
        if index >= pages.len() {
            trace!(index, count = pages.len(), "ignoring out-of-range stack index");
            return;
        }
        for (i, page) in pages.iter().enumerate() {
            page.set_visible(i == index);
        }
        self.current.set(Some(index));
    }

    fn current_index(&self) -> Option<usize> {
        self.current.get()
    }

    fn count(&self) -> usize {
        self.pages.borrow().len()
    }
}

// ── Text inputs ──────────────────────────────────────────────────────────────

/// A plain text input handling physical keys natively.
pub struct HeadlessTextInput {
    id: WidgetId,
    buffer: RefCell<EditBuffer>,
    placeholder: RefCell<String>,
    focus: FocusTracker,
}

impl HeadlessTextInput {
    fn new(buffer: EditBuffer, focus: FocusTracker) -> Self {
        Self {
            id: Uuid::new_v4(),
            buffer: RefCell::new(buffer),
            placeholder: RefCell::new(String::new()),
            focus,
        }
    }

    pub fn placeholder_text(&self) -> String {
        self.placeholder.borrow().clone()
    }
}

impl Widget for HeadlessTextInput {
    fn widget_id(&self) -> WidgetId {
        self.id
    }

    fn key_input(&self) -> Option<&dyn KeyInput> {
        Some(self)
    }
}

impl KeyInput for HeadlessTextInput {
    fn is_virtual_only(&self) -> bool {
        false
    }

    fn key_press_event(&self, event: &mut PhysicalKeyEvent) {
        let mut buffer = self.buffer.borrow_mut();
        let handled = match event.key {
            PhysicalKey::Backspace => {
                buffer.backspace();
                true
            }
            PhysicalKey::Enter if buffer.is_multi_line() => {
                buffer.insert("\n");
                true
            }
            PhysicalKey::ArrowLeft => {
                buffer.move_left();
                true
            }
            PhysicalKey::ArrowRight => {
                buffer.move_right();
                true
            }
            _ => match printable_text(&event.text) {
                Some(text) => {
                    buffer.insert(&text);
                    true
                }
                None => false,
            },
        };
        if handled {
            event.accept();
        } else {
            event.ignore();
        }
    }
}

impl TextControl for HeadlessTextInput {
    fn text(&self) -> String {
        self.buffer.borrow().text().to_string()
    }

    fn has_focus(&self) -> bool {
        self.focus.get() == Some(self.id)
    }

    fn is_multi_line(&self) -> bool {
        self.buffer.borrow().is_multi_line()
    }

    fn cursor_position(&self) -> usize {
        self.buffer.borrow().cursor()
    }

    fn has_selection(&self) -> bool {
        self.buffer.borrow().has_selection()
    }

    fn select(&self, start: usize, end: usize) {
        self.buffer.borrow_mut().select(start, end);
    }

    fn insert(&self, text: &str) {
        self.buffer.borrow_mut().insert(text);
    }

    fn remove_selected_text(&self) -> bool {
        self.buffer.borrow_mut().remove_selection()
    }

    fn delete_previous_char(&self) -> bool {
        self.buffer.borrow_mut().delete_previous_char()
    }

    fn append_paragraph(&self, text: &str) {
        self.buffer.borrow_mut().append_paragraph(text);
    }

    fn set_placeholder_text(&self, text: &str) {
        *self.placeholder.borrow_mut() = text.to_string();
    }

    fn into_widget(self: Rc<Self>) -> Rc<dyn Widget> {
        self
    }
}

// ── Window ───────────────────────────────────────────────────────────────────

/// A top-level window delivering synthetic key presses.
pub struct HeadlessWindow {
    focus: FocusTracker,
    focused: RefCell<Option<Rc<dyn Widget>>>,
    hook: RefCell<Option<KeyHook>>,
}

impl HeadlessWindow {
    pub fn set_focus(&self, widget: Rc<dyn Widget>) {
        self.focus.set(Some(widget.widget_id()));
        *self.focused.borrow_mut() = Some(widget);
    }

    pub fn clear_focus(&self) {
        self.focus.set(None);
        *self.focused.borrow_mut() = None;
    }

    pub fn has_keyboard_grab(&self) -> bool {
        self.hook.borrow().is_some()
    }

    /// Delivers a key press and returns it with its final accepted state.
    ///
    /// With a keyboard grab the hook sees the event instead of the focused
    /// widget.
    pub fn press_key(&self, mut event: PhysicalKeyEvent) -> PhysicalKeyEvent {
        if let Some(hook) = self.hook.borrow_mut().as_mut() {
            hook(&mut event);
            return event;
        }
        let focused = self.focused.borrow().clone();
        if let Some(input) = focused.as_deref().and_then(|widget| widget.key_input()) {
            input.key_press_event(&mut event);
        }
        event
    }
}

impl HostWindow for HeadlessWindow {
    fn focus_widget(&self) -> Option<Rc<dyn Widget>> {
        self.focused.borrow().clone()
    }

    fn grab_keyboard(&self, hook: KeyHook) {
        *self.hook.borrow_mut() = Some(hook);
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
