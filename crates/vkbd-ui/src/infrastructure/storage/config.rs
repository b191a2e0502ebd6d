//! TOML configuration for the virtual keyboard.
//!
//! Example file:
//!
//! ```toml
//! [keyboard]
//! root_layout = "layouts/en-US.xml"
//! key_unit_width = 48
//! key_height = 36
//!
//! [interceptor]
//! policy = "forward_to_focused"   # or "single_field"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every field has a default (see the `default_*` helpers), so a missing
//! file, a missing section, or a missing key all fall back to a working
//! configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::renderer::KeyMetrics;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeyboardAppConfig {
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub interceptor: InterceptorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Layout location and key geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyboardConfig {
    /// Root layout resource; linked pages resolve relative to its directory.
    #[serde(default = "default_root_layout")]
    pub root_layout: PathBuf,
    /// Pixel width of one key unit.
    #[serde(default = "default_key_unit_width")]
    pub key_unit_width: u32,
    /// Pixel height of every key.
    #[serde(default = "default_key_height")]
    pub key_height: u32,
}

/// Which policy the physical key interceptor applies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InterceptorPolicyKind {
    /// Forward to the focused widget unless it is virtual-only.
    #[default]
    ForwardToFocused,
    /// Type every physical key into one designated field.
    SingleField,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterceptorConfig {
    #[serde(default)]
    pub policy: InterceptorPolicyKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_root_layout() -> PathBuf {
    PathBuf::from("layouts/en-US.xml")
}
fn default_key_unit_width() -> u32 {
    KeyMetrics::default().unit_width
}
fn default_key_height() -> u32 {
    KeyMetrics::default().key_height
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            root_layout: default_root_layout(),
            key_unit_width: default_key_unit_width(),
            key_height: default_key_height(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl KeyboardConfig {
    pub fn metrics(&self) -> KeyMetrics {
        KeyMetrics {
            unit_width: self.key_unit_width,
            key_height: self.key_height,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parses configuration text.
///
/// # Errors
///
/// [`ConfigError::Parse`] if the TOML is malformed or a value has the wrong
/// type.
pub fn parse_config(text: &str) -> Result<KeyboardAppConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Loads the configuration at `path`, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<KeyboardAppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(KeyboardAppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Renders `config` as TOML, e.g. to seed a config file.
///
/// # Errors
///
/// [`ConfigError::Serialize`] if serialization fails.
pub fn render_config(config: &KeyboardAppConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
