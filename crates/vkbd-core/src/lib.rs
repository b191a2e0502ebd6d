//! # vkbd-core
//!
//! Shared library for the virtual keyboard containing the keyboard layout
//! model, the declarative layout file format, abstract key identifiers, and
//! the text editing buffer used by input widgets.
//!
//! It has zero dependencies on UI toolkits, windowing systems, or the file
//! system.  Reading layout resources from disk is the job of the caller.
//!
//! # Architecture overview (for beginners)
//!
//! The virtual keyboard is a set of *pages* (lowercase letters, shifted
//! letters, symbols, ...).  Each page is described by one XML resource; keys
//! on a page either emit a keystroke or link to another page.
//!
//! - **`domain`** – Pure data and rules.  [`LayoutDocument`] is one parsed
//!   page; [`EditBuffer`] is the cursor/selection model behind text inputs.
//!
//! - **`format`** – Turns layout XML text into a [`LayoutDocument`].
//!
//! - **`keys`** – The abstract key identifiers carried from on-screen buttons
//!   to text inputs ([`KeyId`]) and the named physical keys a hardware event
//!   can carry ([`PhysicalKey`]).

pub mod domain;
pub mod format;
pub mod keys;

// Re-export the most-used types at the crate root so callers can write
// `vkbd_core::LayoutDocument` instead of `vkbd_core::domain::layout::LayoutDocument`.
pub use domain::edit_buffer::EditBuffer;
pub use domain::layout::{
    Element, InertReason, KeyAction, KeyElement, KeyIcon, KeyStyle, LayoutDocument, PageLink, Row,
    SpacerElement, Symbol, ROOT_LINK,
};
pub use format::parser::{parse_layout, FormatError};
pub use keys::physical::PhysicalKey;
pub use keys::KeyId;
