//! Error types for cairn

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cairn operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cairn operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Addressing error: {0}")]
    Addressing(String),

    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object id: {0}")]
    InvalidId(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Filesystem failures while persisting an object
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create temp file in {dir} after {attempts} attempt(s): {source}")]
    TempFileFailed {
        dir: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write temp file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rename temp file onto {path}: {source}")]
    RenameFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
