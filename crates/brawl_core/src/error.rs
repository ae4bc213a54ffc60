//! Error types for the combat core.
//!
//! Gameplay itself never fails: invalid gameplay conditions are clamped or
//! ignored. These errors only come out of configuration loading.

use thiserror::Error;

/// Result type alias using [`BrawlError`].
pub type Result<T> = std::result::Result<T, BrawlError>;

/// Top-level error type for the combat core.
#[derive(Debug, Error)]
pub enum BrawlError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Configuration text is not valid RON.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Configuration parsed but holds values the simulation cannot run with.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
