//! Window-level capture of hardware key presses.
//!
//! The [`PhysicalKeyInterceptor`] grabs the keyboard of every window it is
//! attached to.  Each captured press goes through the configured
//! [`InterceptPolicy`], is then marked handled so the host does not deliver
//! it a second time, and is finally re-published to observers.
//!
//! Two policies exist:
//!
//! - [`ForwardToFocused`] hands the press to the focused widget unless that
//!   widget is a virtual-only input, so regular inputs keep working while
//!   virtual inputs only ever see on-screen keys.
//! - [`SingleFieldInjection`] ignores focus and edits one designated field
//!   directly, for kiosk setups where a hardware keyboard types into a
//!   single always-active field.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};
use vkbd_core::keys::physical::printable_text;
use vkbd_core::PhysicalKey;

use super::broadcast::{Broadcast, Subscription};
use crate::infrastructure::toolkit::{HostWindow, PhysicalKeyEvent, TextControl};

/// Decides what a captured physical key press does.
pub trait InterceptPolicy {
    fn name(&self) -> &'static str;

    /// Routes `event`, captured on `window`.
    fn route(&self, window: &dyn HostWindow, event: &mut PhysicalKeyEvent);
}

/// Forwards presses to the focused widget unless it is virtual-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardToFocused;

impl InterceptPolicy for ForwardToFocused {
    fn name(&self) -> &'static str {
        "forward_to_focused"
    }

    fn route(&self, window: &dyn HostWindow, event: &mut PhysicalKeyEvent) {
        let Some(widget) = window.focus_widget() else {
            trace!(key = ?event.key, "no focused widget, dropping physical key");
            return;
        };
        match widget.key_input() {
            Some(input) if !input.is_virtual_only() => input.key_press_event(event),
            Some(_) => trace!(
                widget = %widget.widget_id(),
                "focused widget is virtual-only, not forwarding"
            ),
            None => trace!(
                widget = %widget.widget_id(),
                "focused widget takes no key input"
            ),
        }
    }
}

/// Edits one designated field with every press, regardless of focus.
pub struct SingleFieldInjection {
    field: Rc<dyn TextControl>,
}

impl SingleFieldInjection {
    pub fn new(field: Rc<dyn TextControl>) -> Self {
        Self { field }
    }
}

impl InterceptPolicy for SingleFieldInjection {
    fn name(&self) -> &'static str {
        "single_field"
    }

    fn route(&self, _window: &dyn HostWindow, event: &mut PhysicalKeyEvent) {
        match event.key {
            PhysicalKey::Backspace => {
                if !self.field.remove_selected_text() {
                    self.field.delete_previous_char();
                }
            }
            PhysicalKey::Enter => {
                if self.field.is_multi_line() {
                    self.field.insert("\n");
                }
            }
            key if key.is_modifier() => {}
            _ => match printable_text(&event.text) {
                Some(text) => self.field.insert(&text),
                None => trace!(key = ?event.key, "dropping non-printable physical key"),
            },
        }
    }
}

/// Captures physical key presses on attached windows.
pub struct PhysicalKeyInterceptor {
    policy: RefCell<Box<dyn InterceptPolicy>>,
    observed: Rc<Broadcast<PhysicalKeyEvent>>,
    windows: RefCell<Vec<Weak<dyn HostWindow>>>,
}

impl PhysicalKeyInterceptor {
    pub(crate) fn new(policy: Box<dyn InterceptPolicy>) -> Rc<Self> {
        Rc::new(Self {
            policy: RefCell::new(policy),
            observed: Broadcast::new("physical-keys"),
            windows: RefCell::new(Vec::new()),
        })
    }

    /// Grabs the keyboard of `window`.
    ///
    /// Attaching the same window twice is a no-op.
    pub fn attach(self: &Rc<Self>, window: &Rc<dyn HostWindow>) {
        let weak_window = Rc::downgrade(window);
        {
            let mut windows = self.windows.borrow_mut();
            windows.retain(|known| known.strong_count() > 0);
            if windows.iter().any(|known| known.ptr_eq(&weak_window)) {
                debug!("window already attached to the physical key interceptor");
                return;
            }
            windows.push(weak_window.clone());
        }

        let interceptor = Rc::downgrade(self);
        window.grab_keyboard(Box::new(move |event| {
            if let (Some(interceptor), Some(window)) =
                (interceptor.upgrade(), weak_window.upgrade())
            {
                interceptor.intercept(&*window, event);
            }
        }));
        debug!(policy = self.policy_name(), "physical key interceptor attached");
    }

    /// Routes one captured press, accepts it and notifies observers.
    pub fn intercept(&self, window: &dyn HostWindow, event: &mut PhysicalKeyEvent) {
        trace!(key = ?event.key, text = ?event.text, "intercepted physical key");
        self.policy.borrow().route(window, event);
        event.accept();
        self.observed.emit(event);
    }

    /// Subscribes to every captured press, after routing.
    pub fn observe(&self, handler: impl FnMut(&PhysicalKeyEvent) + 'static) -> Subscription {
        self.observed.subscribe(handler)
    }

    /// Replaces the routing policy for subsequent presses.
    pub fn set_policy(&self, policy: Box<dyn InterceptPolicy>) {
        debug!(policy = policy.name(), "physical key policy changed");
        *self.policy.borrow_mut() = policy;
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.borrow().name()
    }

    /// Number of attached windows still alive.
    pub fn attached_windows(&self) -> usize {
        self.windows
            .borrow()
            .iter()
            .filter(|window| window.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::infrastructure::toolkit::headless::{HeadlessToolkit, HeadlessWindow};
    use crate::infrastructure::toolkit::{KeyInput, Toolkit, Widget, WidgetId};

    /// A focusable widget that refuses physical keys, like a virtual input.
    struct VirtualOnly {
        id: WidgetId,
        presses: Cell<usize>,
    }

    impl Widget for VirtualOnly {
        fn widget_id(&self) -> WidgetId {
            self.id
        }

        fn key_input(&self) -> Option<&dyn KeyInput> {
            Some(self)
        }
    }

    impl KeyInput for VirtualOnly {
        fn is_virtual_only(&self) -> bool {
            true
        }

        fn key_press_event(&self, _event: &mut PhysicalKeyEvent) {
            self.presses.set(self.presses.get() + 1);
        }
    }

    fn attached(
        policy: Box<dyn InterceptPolicy>,
    ) -> (Rc<PhysicalKeyInterceptor>, Rc<HeadlessWindow>) {
        let toolkit = HeadlessToolkit::new();
        let window = toolkit.create_window();
        let interceptor = PhysicalKeyInterceptor::new(policy);
        let host: Rc<dyn HostWindow> = window.clone();
        interceptor.attach(&host);
        (interceptor, window)
    }

    // ── ForwardToFocused ──

    #[test]
    fn test_forward_policy_delivers_to_regular_input() {
        // Arrange
        let toolkit = HeadlessToolkit::new();
        let window = toolkit.create_window();
        let interceptor = PhysicalKeyInterceptor::new(Box::new(ForwardToFocused));
        let host: Rc<dyn HostWindow> = window.clone();
        interceptor.attach(&host);
        let edit = toolkit.create_line_edit();
        window.set_focus(Rc::clone(&edit).into_widget());

        // Act
        let event = window.press_key(PhysicalKeyEvent::text("q"));

        // Assert
        assert!(event.is_accepted());
        assert_eq!(edit.text(), "q");
    }

    #[test]
    fn test_forward_policy_skips_virtual_only_input() {
        // Arrange
        let (_interceptor, window) = attached(Box::new(ForwardToFocused));
        let widget = Rc::new(VirtualOnly {
            id: WidgetId::new_v4(),
            presses: Cell::new(0),
        });
        window.set_focus(widget.clone());

        // Act
        let event = window.press_key(PhysicalKeyEvent::text("q"));

        // Assert
        assert_eq!(widget.presses.get(), 0);
        assert!(event.is_accepted());
    }

    #[test]
    fn test_forward_policy_without_focus_still_accepts() {
        let (_interceptor, window) = attached(Box::new(ForwardToFocused));
        let event = window.press_key(PhysicalKeyEvent::text("q"));
        assert!(event.is_accepted());
    }

    // ── SingleFieldInjection ──

    #[test]
    fn test_single_field_policy_edits_field_without_focus() {
        // Arrange
        let toolkit = HeadlessToolkit::new();
        let field = toolkit.create_text_edit();
        let (_interceptor, window) =
            attached(Box::new(SingleFieldInjection::new(Rc::clone(&field))));

        // Act
        for text in ["o", "k"] {
            window.press_key(PhysicalKeyEvent::text(text));
        }
        window.press_key(PhysicalKeyEvent::named(PhysicalKey::Enter));
        window.press_key(PhysicalKeyEvent::text("x"));
        window.press_key(PhysicalKeyEvent::named(PhysicalKey::Backspace));

        // Assert
        assert!(!field.has_focus());
        assert_eq!(field.text(), "ok\n");
    }

    #[test]
    fn test_single_field_policy_drops_control_text_and_modifiers() {
        let toolkit = HeadlessToolkit::new();
        let field = toolkit.create_line_edit();
        let (_interceptor, window) =
            attached(Box::new(SingleFieldInjection::new(Rc::clone(&field))));

        window.press_key(PhysicalKeyEvent::named(PhysicalKey::Shift));
        window.press_key(PhysicalKeyEvent::named(PhysicalKey::Escape));
        window.press_key(PhysicalKeyEvent::named(PhysicalKey::Tab));
        window.press_key(PhysicalKeyEvent::named(PhysicalKey::Enter));

        assert_eq!(field.text(), "");
    }

    // ── Interceptor ──

    #[test]
    fn test_observers_see_every_press_after_routing() {
        // Arrange
        let toolkit = HeadlessToolkit::new();
        let field = toolkit.create_line_edit();
        let (interceptor, window) =
            attached(Box::new(SingleFieldInjection::new(Rc::clone(&field))));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let probe = Rc::clone(&field);
        let _sub = interceptor.observe(move |event| {
            sink.borrow_mut()
                .push((event.text.clone(), event.is_accepted(), probe.text()));
        });

        // Act
        window.press_key(PhysicalKeyEvent::text("z"));

        // Assert
        assert_eq!(
            *seen.borrow(),
            vec![("z".to_string(), true, "z".to_string())]
        );
    }

    #[test]
    fn test_attaching_same_window_twice_is_ignored() {
        let (interceptor, window) = attached(Box::new(ForwardToFocused));
        let host: Rc<dyn HostWindow> = window.clone();

        interceptor.attach(&host);

        assert_eq!(interceptor.attached_windows(), 1);
        assert!(window.has_keyboard_grab());
    }

    #[test]
    fn test_window_without_interceptor_has_no_grab() {
        let toolkit = HeadlessToolkit::new();
        let window = toolkit.create_window();

        assert!(!window.has_keyboard_grab());
    }

    #[test]
    fn test_set_policy_switches_routing() {
        // Arrange
        let toolkit = HeadlessToolkit::new();
        let field = toolkit.create_line_edit();
        let (interceptor, window) = attached(Box::new(ForwardToFocused));

        // Act
        interceptor.set_policy(Box::new(SingleFieldInjection::new(Rc::clone(&field))));
        window.press_key(PhysicalKeyEvent::text("a"));

        // Assert
        assert_eq!(interceptor.policy_name(), "single_field");
        assert_eq!(field.text(), "a");
    }
}
