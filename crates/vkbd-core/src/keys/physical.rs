//! Named physical keys and character-class filtering for hardware key events.

/// The key carried by a hardware key event.
///
/// Only the keys the routing layer treats specially get their own variant;
/// every other key is [`PhysicalKey::Other`] and is described by the event's
/// text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalKey {
    Backspace,
    Enter,
    Tab,
    Escape,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Shift,
    Control,
    Alt,
    Meta,
    /// A key that produces text (letters, digits, punctuation, space).
    Character,
    Other,
}

impl PhysicalKey {
    /// Looks a key up by its conventional name (`"backspace"`, `"enter"`, ...).
    ///
    /// Returns `None` for names that are not recognised.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "backspace" => PhysicalKey::Backspace,
            "enter" | "return" => PhysicalKey::Enter,
            "tab" => PhysicalKey::Tab,
            "escape" | "esc" => PhysicalKey::Escape,
            "delete" | "del" => PhysicalKey::Delete,
            "left" => PhysicalKey::ArrowLeft,
            "right" => PhysicalKey::ArrowRight,
            "up" => PhysicalKey::ArrowUp,
            "down" => PhysicalKey::ArrowDown,
            "shift" => PhysicalKey::Shift,
            "ctrl" | "control" => PhysicalKey::Control,
            "alt" => PhysicalKey::Alt,
            "meta" | "super" => PhysicalKey::Meta,
            _ => return None,
        };
        Some(key)
    }

    /// Returns `true` for keys that never produce text on their own.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            PhysicalKey::Shift | PhysicalKey::Control | PhysicalKey::Alt | PhysicalKey::Meta
        )
    }
}

/// Strips control code points from `text`.
///
/// Returns `None` when nothing printable remains, so callers can drop the
/// event entirely.
pub fn printable_text(text: &str) -> Option<String> {
    let printable: String = text.chars().filter(|c| !c.is_control()).collect();
    if printable.is_empty() {
        None
    } else {
        Some(printable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_text_keeps_letters_and_space() {
        assert_eq!(printable_text("a b"), Some("a b".to_string()));
    }

    #[test]
    fn test_printable_text_strips_control_code_points() {
        // Backspace (0x08), carriage return and escape are control characters.
        assert_eq!(printable_text("\u{8}x\r\u{1b}"), Some("x".to_string()));
    }

    #[test]
    fn test_printable_text_returns_none_when_only_controls() {
        assert_eq!(printable_text("\t\n"), None);
        assert_eq!(printable_text(""), None);
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(PhysicalKey::from_name("Enter"), Some(PhysicalKey::Enter));
        assert_eq!(PhysicalKey::from_name("RETURN"), Some(PhysicalKey::Enter));
        assert_eq!(PhysicalKey::from_name("nope"), None);
    }

    #[test]
    fn test_modifiers_are_flagged() {
        assert!(PhysicalKey::Shift.is_modifier());
        assert!(!PhysicalKey::Character.is_modifier());
    }
}
