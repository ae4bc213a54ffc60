//! Error types for the headless runner.

use std::path::PathBuf;

use brawl_core::error::BrawlError;
use thiserror::Error;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Errors from loading configuration or writing results.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Round configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] BrawlError),

    /// Reading or writing a results file failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Results could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A batch or verification was asked to run zero rounds.
    #[error("Nothing to run: {0}")]
    Empty(&'static str),
}
