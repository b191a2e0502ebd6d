//! Key identifiers.
//!
//! Two vocabularies meet in the keyboard engine:
//!
//! - [`KeyId`] is what an on-screen button publishes on the key event bus:
//!   either literal text to insert or one of the reserved control tokens.
//! - [`PhysicalKey`] names the key carried by a hardware key event captured
//!   from the host window.

pub mod physical;

pub use physical::PhysicalKey;

use std::fmt;

/// Reserved control token that deletes backwards.
pub const BACKSPACE_TOKEN: &str = "backspace";

/// Reserved control token that breaks the line (multi-line inputs only).
pub const RETURN_TOKEN: &str = "return";

/// An abstract key identifier, the payload of the key event bus.
///
/// Keystroke strings from layout resources are mapped with [`KeyId::parse`]:
/// the reserved tokens become control identifiers, anything else is text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyId {
    /// Delete the selection, or the character before the cursor.
    Backspace,
    /// Start a new paragraph.
    Return,
    /// Literal text inserted at the cursor.
    Text(String),
}

impl KeyId {
    /// Maps a keystroke string to its identifier.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vkbd_core::KeyId;
    ///
    /// assert_eq!(KeyId::parse("backspace"), KeyId::Backspace);
    /// assert_eq!(KeyId::parse("q"), KeyId::Text("q".to_string()));
    /// ```
    pub fn parse(keystroke: &str) -> Self {
        match keystroke {
            BACKSPACE_TOKEN => KeyId::Backspace,
            RETURN_TOKEN => KeyId::Return,
            text => KeyId::Text(text.to_string()),
        }
    }

    /// Returns the wire form of the identifier.
    pub fn as_str(&self) -> &str {
        match self {
            KeyId::Backspace => BACKSPACE_TOKEN,
            KeyId::Return => RETURN_TOKEN,
            KeyId::Text(text) => text,
        }
    }

    /// Returns `true` for the reserved control identifiers.
    pub fn is_control(&self) -> bool {
        !matches!(self, KeyId::Text(_))
    }
}

impl From<&str> for KeyId {
    fn from(keystroke: &str) -> Self {
        KeyId::parse(keystroke)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maps_reserved_tokens_to_control_ids() {
        assert_eq!(KeyId::parse("backspace"), KeyId::Backspace);
        assert_eq!(KeyId::parse("return"), KeyId::Return);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        // Only the lowercase tokens are reserved; "Return" is literal text.
        assert_eq!(KeyId::parse("Return"), KeyId::Text("Return".to_string()));
    }

    #[test]
    fn test_parse_keeps_whitespace_text_literal() {
        assert_eq!(KeyId::parse(" "), KeyId::Text(" ".to_string()));
    }

    #[test]
    fn test_as_str_returns_wire_form() {
        assert_eq!(KeyId::Backspace.as_str(), "backspace");
        assert_eq!(KeyId::Text("&".to_string()).as_str(), "&");
    }

    #[test]
    fn test_is_control_only_for_reserved_ids() {
        assert!(KeyId::Return.is_control());
        assert!(!KeyId::from("a").is_control());
    }
}
