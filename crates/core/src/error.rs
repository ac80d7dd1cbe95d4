//! Error types for the starfield core.
//!
//! Runtime animation never fails: a missing surface, layout box or drawing
//! context is a silent no-op. Errors only surface at the edges, when building
//! a configuration or writing snapshots.

use thiserror::Error;

/// Errors produced while configuring or exporting a starfield.
#[derive(Debug, Error)]
pub enum StarfieldError {
    /// Width or height was zero, or the surface exceeds the pixel limit.
    #[error("invalid dimensions: width and height must be non-zero and within the pixel limit")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A configuration value was out of its allowed range.
    #[error("invalid config value for '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// Reading a config file or writing a snapshot failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl StarfieldError {
    pub(crate) fn config(name: &str, reason: impl Into<String>) -> Self {
        StarfieldError::InvalidConfig {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}
