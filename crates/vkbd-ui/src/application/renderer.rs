//! Builds one keyboard page from a layout document.
//!
//! Each row is laid out left to right between two stretches, so rows of
//! different widths are centred.  Spacers become fixed blank space and keys
//! become non-focusable buttons sized in key units.  Wiring a button to its
//! action happens here too: link keys switch pages through the registry,
//! keystroke keys publish on the key event bus, and inert keys do nothing.

use std::rc::{Rc, Weak};

use tracing::{trace, warn};
use vkbd_core::{Element, InertReason, KeyAction, KeyElement, LayoutDocument, Symbol};

use super::key_bus::KeyEventBus;
use super::page_registry::{PageRegistry, RenderedKey, RenderedPage};
use crate::infrastructure::toolkit::{ButtonControl, PageBuilder, Toolkit};

/// Pixel size of one key unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMetrics {
    /// Width of a key with `width="1"`.
    pub unit_width: u32,
    pub key_height: u32,
}

impl Default for KeyMetrics {
    fn default() -> Self {
        Self {
            unit_width: 48,
            key_height: 36,
        }
    }
}

impl KeyMetrics {
    /// Pixel width of `units` key units, truncated.
    pub fn scaled(&self, units: f32) -> u32 {
        (units * self.unit_width as f32) as u32
    }
}

/// Turns layout documents into registered-ready pages.
pub struct PageRenderer {
    toolkit: Rc<dyn Toolkit>,
    bus: Rc<KeyEventBus>,
    registry: Weak<PageRegistry>,
    root_page_id: String,
    metrics: KeyMetrics,
}

impl PageRenderer {
    pub fn new(
        toolkit: Rc<dyn Toolkit>,
        bus: Rc<KeyEventBus>,
        registry: &Rc<PageRegistry>,
        root_page_id: impl Into<String>,
        metrics: KeyMetrics,
    ) -> Self {
        Self {
            toolkit,
            bus,
            registry: Rc::downgrade(registry),
            root_page_id: root_page_id.into(),
            metrics,
        }
    }

    /// Builds the page for `document` under `page_id`.
    pub fn render(&self, page_id: &str, document: &LayoutDocument) -> RenderedPage {
        let mut builder = self.toolkit.create_page_builder();
        let mut keys = Vec::new();

        for row in &document.rows {
            builder.begin_row();
            builder.add_stretch();
            for element in &row.elements {
                match element {
                    Element::Spacer(spacer) => {
                        builder.add_spacing(self.metrics.scaled(spacer.width));
                    }
                    Element::Key(key) => {
                        keys.push(self.render_key(page_id, key, builder.as_mut()));
                    }
                }
            }
            builder.add_stretch();
        }

        RenderedPage {
            page_id: page_id.to_string(),
            name: document.name.clone(),
            view: builder.finish(),
            keys,
        }
    }

    /// A page with no rows, shown when nothing could be loaded.
    pub fn render_blank(&self, page_id: &str) -> RenderedPage {
        RenderedPage {
            page_id: page_id.to_string(),
            name: String::new(),
            view: self.toolkit.create_page_builder().finish(),
            keys: Vec::new(),
        }
    }

    fn render_key(
        &self,
        page_id: &str,
        key: &KeyElement,
        builder: &mut dyn PageBuilder,
    ) -> RenderedKey {
        let button = self.toolkit.create_button();
        button.set_object_name(&key.style.object_name());
        button.set_focusable(false);
        match key.face() {
            Symbol::Icon(icon) => button.set_icon(icon),
            Symbol::Text(text) => button.set_text(&text),
        }

        let action = key.action();
        let target_page = self.connect(page_id, key, &action, button.as_ref());

        builder.add_button(Rc::clone(&button));
        // Fixed size is applied once the button sits in its row.
        let width = self.metrics.scaled(key.width).max(button.minimum_width());
        button.set_fixed_size(width, self.metrics.key_height);

        RenderedKey {
            element: key.clone(),
            action,
            button,
            target_page,
        }
    }

    /// Wires the click handler; returns the page a link key targets.
    fn connect(
        &self,
        page_id: &str,
        key: &KeyElement,
        action: &KeyAction,
        button: &dyn ButtonControl,
    ) -> Option<String> {
        match action {
            KeyAction::SwitchPage(link) => {
                let target = link.resolve(&self.root_page_id).to_string();
                let registry = Weak::clone(&self.registry);
                let destination = target.clone();
                button.connect_clicked(Box::new(move || {
                    if let Some(registry) = registry.upgrade() {
                        // Failures are logged by the registry.
                        let _ = registry.switch_to(&destination);
                    }
                }));
                trace!(page = %page_id, symbol = %key.symbol, target = %target, "link key");
                Some(target)
            }
            KeyAction::Emit(key_id) => {
                let bus = Rc::clone(&self.bus);
                let key_id = key_id.clone();
                button.connect_clicked(Box::new(move || {
                    bus.publish(&key_id);
                }));
                None
            }
            KeyAction::Inert(reason) => {
                let detail = match reason {
                    InertReason::EmptyKeystroke => "empty keystroke",
                    InertReason::NoAction => "neither keystroke nor layout link",
                };
                warn!(page = %page_id, symbol = %key.symbol, "key has {detail}, it does nothing");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use vkbd_core::{parse_layout, KeyId};

    use super::*;
    use crate::application::services::Services;
    use crate::infrastructure::toolkit::headless::{HeadlessToolkit, RowItem};

    const PAGE: &str = r#"
        <Layout name="Test">
            <Row>
                <Key symbol="a" keystroke="a"/>
                <Spacer width="0.5"/>
                <Key symbol="&amp;" keystroke="&amp;" width="2"/>
            </Row>
            <Row>
                <Key symbol="ICON_SHIFT" style="Secondary" width="1.5" layoutLink="shift.xml"/>
                <Key symbol="ABC" layoutLink="ROOT"/>
                <Key symbol="dead"/>
                <Key symbol="mute" keystroke=""/>
            </Row>
        </Layout>"#;

    struct Fixture {
        toolkit: Rc<HeadlessToolkit>,
        registry: Rc<PageRegistry>,
        renderer: PageRenderer,
        bus: Rc<KeyEventBus>,
        _services: Services,
    }

    fn fixture() -> Fixture {
        let mut services = Services::new();
        let bus = services.install_key_bus().expect("fresh services");
        let toolkit = Rc::new(HeadlessToolkit::new());
        let registry = PageRegistry::new(toolkit.create_stack());
        let renderer = PageRenderer::new(
            toolkit.clone(),
            Rc::clone(&bus),
            &registry,
            "root.xml",
            KeyMetrics::default(),
        );
        Fixture {
            toolkit,
            registry,
            renderer,
            bus,
            _services: services,
        }
    }

    // ── Layout ──

    #[test]
    fn test_rows_are_centred_between_stretches() {
        // Arrange
        let fx = fixture();
        let document = parse_layout(PAGE).expect("valid layout");

        // Act
        fx.renderer.render("root.xml", &document);

        // Assert
        let pages = fx.toolkit.built_pages();
        let rows = pages[0].rows();
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert!(matches!(row.first(), Some(RowItem::Stretch)));
            assert!(matches!(row.last(), Some(RowItem::Stretch)));
        }
        assert!(matches!(rows[0][2], RowItem::Spacing(24)));
    }

    #[test]
    fn test_key_width_scales_with_units_but_never_below_minimum() {
        // Arrange
        let fx = fixture();
        let document = parse_layout(PAGE).expect("valid layout");

        // Act
        let page = fx.renderer.render("root.xml", &document);

        // Assert
        let amp = page.key("&").expect("ampersand key");
        assert_eq!(amp.button.size(), (96, 36));
        let abc = page.key("ABC").expect("abc key");
        assert_eq!(abc.button.size().0, abc.button.minimum_width().max(48));
    }

    #[test]
    fn test_row_width_sums_keys_and_spacers() {
        // Arrange
        let fx = fixture();
        let document = parse_layout(PAGE).expect("valid layout");

        // Act
        fx.renderer.render("root.xml", &document);

        // Assert: 48 + 24 + 96
        let pages = fx.toolkit.built_pages();
        assert_eq!(pages[0].row_width(0), 168);
        assert_eq!(pages[0].row_width(9), 0);
    }

    #[test]
    fn test_oversized_keys_saturate_instead_of_overflowing() {
        // Arrange
        let fx = fixture();
        let document = parse_layout(
            r#"<Layout name="Wide"><Row>
                <Key symbol="x" keystroke="x" width="1e30"/>
                <Key symbol="y" keystroke="y" width="1e30"/>
            </Row></Layout>"#,
        )
        .expect("valid layout");

        // Act
        let page = fx.renderer.render("wide.xml", &document);

        // Assert
        assert_eq!(page.key("x").expect("x key").button.size().0, u32::MAX);
        assert_eq!(fx.toolkit.built_pages()[0].row_width(0), u32::MAX);
    }

    // ── Actions ──

    #[test]
    fn test_keystroke_key_publishes_on_bus() {
        // Arrange
        let fx = fixture();
        let page = fx.renderer.render("root.xml", &parse_layout(PAGE).expect("valid"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = fx.bus.subscribe(move |key| sink.borrow_mut().push(key.clone()));

        // Act
        page.press("a");
        page.press("&");

        // Assert
        assert_eq!(
            *seen.borrow(),
            vec![KeyId::Text("a".into()), KeyId::Text("&".into())]
        );
    }

    #[test]
    fn test_link_keys_resolve_root_and_switch_pages() {
        // Arrange
        let fx = fixture();
        let document = parse_layout(PAGE).expect("valid");
        let root = fx.renderer.render("root.xml", &document);
        let shift = fx.renderer.render("shift.xml", &document);
        fx.registry.register(root);
        fx.registry.register(shift);
        let root = fx.registry.page("root.xml").expect("registered");

        // Act
        root.press("ICON_SHIFT");
        let after_shift = fx.registry.active_page_id();
        fx.registry
            .page("shift.xml")
            .expect("registered")
            .press("ABC");

        // Assert
        assert_eq!(after_shift.as_deref(), Some("shift.xml"));
        assert_eq!(fx.registry.active_page_id().as_deref(), Some("root.xml"));
        assert_eq!(
            root.key("ABC").and_then(|key| key.target_page.as_deref()),
            Some("root.xml")
        );
    }

    #[test]
    fn test_inert_keys_are_built_but_do_nothing() {
        // Arrange
        let fx = fixture();
        let page = fx.renderer.render("root.xml", &parse_layout(PAGE).expect("valid"));
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let _sub = fx.bus.subscribe(move |_| *counter.borrow_mut() += 1);

        // Act
        assert!(page.press("dead"));
        assert!(page.press("mute"));

        // Assert
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(
            page.key("mute").map(|key| key.action.clone()),
            Some(KeyAction::Inert(InertReason::EmptyKeystroke))
        );
    }

    #[test]
    fn test_buttons_are_not_focusable_and_carry_style_name() {
        let fx = fixture();
        fx.renderer.render("root.xml", &parse_layout(PAGE).expect("valid"));

        let pages = fx.toolkit.built_pages();
        let shift = pages[0].rows()[1]
            .iter()
            .find_map(|item| match item {
                RowItem::Button(button) => Some(Rc::clone(button)),
                _ => None,
            })
            .expect("shift button");

        assert_eq!(shift.size(), (72, 36));
        assert!(!shift.is_focusable());
        assert_eq!(shift.object_name(), "VirtualKeyboard_Key_Secondary");
        assert_eq!(fx.registry.len(), 0);
    }
}
