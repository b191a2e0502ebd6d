//! Storage infrastructure: configuration and layout resources on disk.
//!
//! - **`config`** reads the TOML configuration file and supplies defaults
//!   when the file does not exist yet.
//! - **`layout_source`** abstracts reading layout XML so the loader can be
//!   exercised against in-memory or mocked sources.

pub mod config;
pub mod layout_source;
