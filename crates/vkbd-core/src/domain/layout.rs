//! Keyboard layout domain entity.
//!
//! A [`LayoutDocument`] describes one page of the keyboard: ordered rows, each
//! holding keys and spacers laid out left to right.  Keys either emit a
//! keystroke or link to another page; the reserved link [`ROOT_LINK`] always
//! means "the page the keyboard was built from".

use tracing::debug;

use crate::keys::KeyId;

/// Reserved `layoutLink` value that returns to the root page.
///
/// Resolved when the page is rendered, never when it is loaded.
pub const ROOT_LINK: &str = "ROOT";

/// Name used when a layout resource does not carry a `name` attribute.
pub const DEFAULT_LAYOUT_NAME: &str = "Unknown Layout";

/// Visual class of a key.
///
/// The set is observed in shipped layouts but not closed by the file format;
/// unknown values fall back to [`KeyStyle::Std`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyStyle {
    #[default]
    Std,
    Primary,
    Secondary,
    Tertiary,
}

impl KeyStyle {
    /// Maps a `style` attribute value to a style.
    pub fn from_attr(value: &str) -> Self {
        match value {
            "Std" => KeyStyle::Std,
            "Primary" => KeyStyle::Primary,
            "Secondary" => KeyStyle::Secondary,
            "Tertiary" => KeyStyle::Tertiary,
            other => {
                debug!("unknown key style '{other}', using Std");
                KeyStyle::Std
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeyStyle::Std => "Std",
            KeyStyle::Primary => "Primary",
            KeyStyle::Secondary => "Secondary",
            KeyStyle::Tertiary => "Tertiary",
        }
    }

    /// Returns the object name stylesheets use to select keys of this style.
    pub fn object_name(self) -> String {
        format!("VirtualKeyboard_Key_{}", self.as_str())
    }
}

/// Glyphs that replace the literal text of specially named symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIcon {
    /// `ICON_SHIFT`: switch to the shifted page.
    Shift,
    /// `ICON_UNSHIFT`: leave the shifted page.
    Unshift,
    /// `ICON_BKSP`: delete backwards.
    Backspace,
}

impl KeyIcon {
    /// Returns the icon for a special symbol identifier, if it is one.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "ICON_SHIFT" => Some(KeyIcon::Shift),
            "ICON_UNSHIFT" => Some(KeyIcon::Unshift),
            "ICON_BKSP" => Some(KeyIcon::Backspace),
            _ => None,
        }
    }

    /// Material Design icon name rendered for this glyph.
    pub fn glyph_name(self) -> &'static str {
        match self {
            KeyIcon::Shift => "arrow_up_bold_outline",
            KeyIcon::Unshift => "arrow_up_bold",
            KeyIcon::Backspace => "keyboard_backspace",
        }
    }
}

/// What a key face shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Icon(KeyIcon),
    /// Display text with the toolkit mnemonic marker (`&`) doubled so it
    /// renders literally.
    Text(String),
}

/// Target of a page-switching key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageLink {
    /// The root page, whatever its id turns out to be.
    Root,
    /// A page id, relative to the directory of the root resource.
    Page(String),
}

impl PageLink {
    pub fn parse(link: &str) -> Self {
        if link == ROOT_LINK {
            PageLink::Root
        } else {
            PageLink::Page(link.to_string())
        }
    }

    /// Resolves the link to a concrete page id.
    pub fn resolve<'a>(&'a self, root_page_id: &'a str) -> &'a str {
        match self {
            PageLink::Root => root_page_id,
            PageLink::Page(id) => id,
        }
    }
}

/// Why a key does nothing when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertReason {
    /// `keystroke=""` was given.
    EmptyKeystroke,
    /// Neither `keystroke` nor `layoutLink` was given.
    NoAction,
}

/// The resolved behaviour of a key, checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    SwitchPage(PageLink),
    Emit(KeyId),
    Inert(InertReason),
}

/// A pressable key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyElement {
    /// Literal label or one of the `ICON_*` identifiers.
    pub symbol: String,
    pub style: KeyStyle,
    /// String published on the key event bus when pressed.
    pub keystroke: Option<String>,
    /// Width in key units (non-negative).
    pub width: f32,
    /// Page to switch to when pressed; takes precedence over `keystroke`.
    pub layout_link: Option<String>,
}

impl Default for KeyElement {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            style: KeyStyle::Std,
            keystroke: None,
            width: 1.0,
            layout_link: None,
        }
    }
}

impl KeyElement {
    /// Resolves what pressing this key does.
    pub fn action(&self) -> KeyAction {
        if let Some(link) = self.layout_link.as_deref().filter(|l| !l.is_empty()) {
            return KeyAction::SwitchPage(PageLink::parse(link));
        }
        match self.keystroke.as_deref() {
            Some("") => KeyAction::Inert(InertReason::EmptyKeystroke),
            Some(keystroke) => KeyAction::Emit(KeyId::parse(keystroke)),
            None => KeyAction::Inert(InertReason::NoAction),
        }
    }

    /// Returns the face of the key.
    pub fn face(&self) -> Symbol {
        match KeyIcon::from_symbol(&self.symbol) {
            Some(icon) => Symbol::Icon(icon),
            None => Symbol::Text(self.symbol.replace('&', "&&")),
        }
    }
}

/// Blank space between keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacerElement {
    /// Width in key units (non-negative).
    pub width: f32,
}

impl Default for SpacerElement {
    fn default() -> Self {
        Self { width: 1.0 }
    }
}

/// One element of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Key(KeyElement),
    Spacer(SpacerElement),
}

impl Element {
    pub fn width(&self) -> f32 {
        match self {
            Element::Key(key) => key.width,
            Element::Spacer(spacer) => spacer.width,
        }
    }
}

/// A horizontal row of elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Free-form `type` attribute; informational only.
    pub row_type: Option<String>,
    pub elements: Vec<Element>,
}

/// One parsed keyboard page.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDocument {
    pub name: String,
    pub rows: Vec<Row>,
}

impl LayoutDocument {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Iterates over every key in row order, left to right.
    pub fn keys(&self) -> impl Iterator<Item = &KeyElement> {
        self.rows.iter().flat_map(|row| {
            row.elements.iter().filter_map(|element| match element {
                Element::Key(key) => Some(key),
                Element::Spacer(_) => None,
            })
        })
    }

    /// Page ids this page links to, excluding [`ROOT_LINK`], in document order.
    ///
    /// Duplicates are kept; the loader's visit set absorbs them.
    pub fn linked_pages(&self) -> impl Iterator<Item = &str> {
        self.keys().filter_map(|key| match key.action() {
            KeyAction::SwitchPage(PageLink::Page(_)) => key.layout_link.as_deref(),
            _ => None,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key(symbol: &str) -> KeyElement {
        KeyElement {
            symbol: symbol.to_string(),
            ..KeyElement::default()
        }
    }

    // ── KeyStyle ──────────────────────────────────────────────────────────────

    #[test]
    fn test_key_style_from_attr_recognises_known_styles() {
        assert_eq!(KeyStyle::from_attr("Primary"), KeyStyle::Primary);
        assert_eq!(KeyStyle::from_attr("Tertiary"), KeyStyle::Tertiary);
    }

    #[test]
    fn test_key_style_from_attr_falls_back_to_std_for_unknown() {
        assert_eq!(KeyStyle::from_attr("Fancy"), KeyStyle::Std);
        assert_eq!(KeyStyle::from_attr(""), KeyStyle::Std);
    }

    #[test]
    fn test_key_style_object_name_embeds_style() {
        assert_eq!(KeyStyle::Secondary.object_name(), "VirtualKeyboard_Key_Secondary");
    }

    // ── KeyElement::action ────────────────────────────────────────────────────

    #[test]
    fn test_action_prefers_layout_link_over_keystroke() {
        let k = KeyElement {
            keystroke: Some("a".to_string()),
            layout_link: Some("shift.xml".to_string()),
            ..key("a")
        };
        assert_eq!(
            k.action(),
            KeyAction::SwitchPage(PageLink::Page("shift.xml".to_string()))
        );
    }

    #[test]
    fn test_action_recognises_root_sentinel() {
        let k = KeyElement {
            layout_link: Some("ROOT".to_string()),
            ..key("abc")
        };
        assert_eq!(k.action(), KeyAction::SwitchPage(PageLink::Root));
    }

    #[test]
    fn test_action_emits_parsed_keystroke() {
        let k = KeyElement {
            keystroke: Some("backspace".to_string()),
            ..key("ICON_BKSP")
        };
        assert_eq!(k.action(), KeyAction::Emit(KeyId::Backspace));
    }

    #[test]
    fn test_action_empty_layout_link_falls_through_to_keystroke() {
        let k = KeyElement {
            keystroke: Some("x".to_string()),
            layout_link: Some(String::new()),
            ..key("x")
        };
        assert_eq!(k.action(), KeyAction::Emit(KeyId::Text("x".to_string())));
    }

    #[test]
    fn test_action_is_inert_without_keystroke_or_link() {
        assert_eq!(key("?").action(), KeyAction::Inert(InertReason::NoAction));
    }

    #[test]
    fn test_action_is_inert_for_empty_keystroke() {
        let k = KeyElement {
            keystroke: Some(String::new()),
            ..key("?")
        };
        assert_eq!(k.action(), KeyAction::Inert(InertReason::EmptyKeystroke));
    }

    // ── KeyElement::face ──────────────────────────────────────────────────────

    #[test]
    fn test_face_maps_icon_symbols() {
        assert_eq!(key("ICON_SHIFT").face(), Symbol::Icon(KeyIcon::Shift));
        assert_eq!(key("ICON_UNSHIFT").face(), Symbol::Icon(KeyIcon::Unshift));
        assert_eq!(key("ICON_BKSP").face(), Symbol::Icon(KeyIcon::Backspace));
    }

    #[test]
    fn test_face_doubles_mnemonic_marker() {
        assert_eq!(key("&").face(), Symbol::Text("&&".to_string()));
        assert_eq!(key("a&b").face(), Symbol::Text("a&&b".to_string()));
    }

    // ── PageLink ──────────────────────────────────────────────────────────────

    #[test]
    fn test_page_link_resolve_root_returns_root_id() {
        assert_eq!(PageLink::Root.resolve("en-US.xml"), "en-US.xml");
        assert_eq!(
            PageLink::Page("symbols.xml".to_string()).resolve("en-US.xml"),
            "symbols.xml"
        );
    }

    // ── LayoutDocument ────────────────────────────────────────────────────────

    #[test]
    fn test_linked_pages_skips_root_and_keystroke_keys() {
        let doc = LayoutDocument::new(
            "test",
            vec![Row {
                row_type: None,
                elements: vec![
                    Element::Key(KeyElement {
                        layout_link: Some("b.xml".to_string()),
                        ..key("b")
                    }),
                    Element::Spacer(SpacerElement::default()),
                    Element::Key(KeyElement {
                        layout_link: Some("ROOT".to_string()),
                        ..key("abc")
                    }),
                    Element::Key(KeyElement {
                        keystroke: Some("c".to_string()),
                        ..key("c")
                    }),
                    Element::Key(KeyElement {
                        layout_link: Some("d.xml".to_string()),
                        ..key("d")
                    }),
                ],
            }],
        );

        let links: Vec<&str> = doc.linked_pages().collect();
        assert_eq!(links, vec!["b.xml", "d.xml"]);
    }

    #[test]
    fn test_keys_skips_spacers() {
        let doc = LayoutDocument::new(
            "test",
            vec![Row {
                row_type: Some("letters".to_string()),
                elements: vec![
                    Element::Spacer(SpacerElement { width: 0.5 }),
                    Element::Key(key("q")),
                ],
            }],
        );
        assert_eq!(doc.keys().count(), 1);
        assert_eq!(doc.rows[0].elements[0].width(), 0.5);
    }
}
