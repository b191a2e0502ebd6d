//! Domain entities for the virtual keyboard.
//!
//! This module contains pure logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The innermost layer of the application.  Domain code has **no** imports
//! from UI toolkits, OS APIs, or the file system, so it can be compiled and
//! tested anywhere.  Outer layers (the page registry, the renderer, the
//! headless toolkit) depend on it; it never depends on them.

/// Keyboard layout documents.
///
/// See [`layout::LayoutDocument`] for the main type.
pub mod layout;

/// Cursor and selection model for text inputs.
pub mod edit_buffer;
