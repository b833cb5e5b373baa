//! Error types for the joint BPE library.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for the joint BPE library.
#[derive(Error, Debug)]
pub enum BpeError {
    /// Invalid configuration, reported before any work starts
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Malformed line in a merge-operations file
    #[error("Invalid merge rule at line {line}: '{content}'")]
    InvalidMerge { line: usize, content: String },

    /// Malformed `token frequency` line in a dictionary or vocabulary file
    #[error("Invalid entry at line {line}: '{content}'")]
    InvalidEntry { line: usize, content: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BpeError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            err,
        }
    }
}

/// Result type alias for joint BPE operations.
pub type Result<T> = std::result::Result<T, BpeError>;
