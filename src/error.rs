//! Error types for the visualization.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fallible operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by devices, export and presentation
#[derive(Error, Debug)]
pub enum Error {
    /// Audio capture could not be started
    #[error("Audio capture unavailable: {0}")]
    Audio(String),

    /// Snapshot could not be written
    #[error("Failed to export snapshot {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// GPU surface or device failure
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
