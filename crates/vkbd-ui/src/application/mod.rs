//! Application layer of the virtual keyboard.
//!
//! # What lives here? (for beginners)
//!
//! The application layer turns parsed layout documents into live keyboard
//! pages and routes key presses from those pages to text inputs.  It talks
//! to the UI only through the toolkit traits in
//! `infrastructure::toolkit`, so the same code drives a real widget set or
//! the headless one used in tests.
//!
//! # Sub-modules
//!
//! - **`services`** – The application context.  Owns the single key event
//!   bus and the single physical key interceptor, and hands them out to the
//!   components that need them.
//!
//! - **`broadcast`** – A small single-threaded publish/subscribe channel
//!   used by both the key event bus and the interceptor.
//!
//! - **`key_bus`** – Carries [`vkbd_core::KeyId`]s from on-screen keys to
//!   every virtual text input.
//!
//! - **`interceptor`** – Captures hardware key presses at the window level
//!   and applies a routing policy to them.
//!
//! - **`loader`** – Walks the graph of linked layout files starting at the
//!   root layout, caching parsed documents and loading each page once.
//!
//! - **`renderer`** – Builds one page of buttons from a layout document.
//!
//! - **`page_registry`** – Tracks rendered pages and which one is shown.
//!
//! - **`keyboard`** – The [`keyboard::VirtualKeyboard`] facade tying the
//!   loader, renderer and registry together.
//!
//! - **`virtual_input`** – Text inputs fed only by the key event bus.

pub mod broadcast;
pub mod interceptor;
pub mod key_bus;
pub mod keyboard;
pub mod loader;
pub mod page_registry;
pub mod renderer;
pub mod services;
pub mod virtual_input;
