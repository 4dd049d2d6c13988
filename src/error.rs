// src/error.rs

use thiserror::Error;

/// Core error types for Modman
#[derive(Error, Debug)]
pub enum Error {
    /// Community identifier is not in the configured table
    #[error("Unknown community: {0}")]
    UnknownCommunity(String),

    /// Registry catalog could not be fetched or decoded
    #[error("Registry unavailable: {0}")]
    Registry(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Installed-state file could not be parsed
    #[error("State file error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed mod archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Result type alias using Modman's Error type
pub type Result<T> = std::result::Result<T, Error>;
