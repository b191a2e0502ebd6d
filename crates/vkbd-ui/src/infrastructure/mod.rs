//! Infrastructure layer for the virtual keyboard.
//!
//! Contains the host-facing adapters: the UI toolkit ports (and an in-memory
//! headless toolkit implementing them) and file-system storage for
//! configuration and layout resources.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `vkbd_core`; the application layer only uses the toolkit *traits* and the
//! storage *traits* declared here, never a concrete adapter.

pub mod storage;
pub mod toolkit;
