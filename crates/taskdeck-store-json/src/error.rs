//! Error types for JSON store operations.

use std::path::PathBuf;

use taskdeck_core::StoreError;
use thiserror::Error;

/// Errors that can occur during `JsonStore` operations.
#[derive(Error, Debug)]
pub enum JsonStoreError {
    /// Reading or writing the save file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The save file exists but is not a valid task list.
    #[error("failed to parse {}: {source}", .path.display())]
    Format {
        /// File being parsed.
        path: PathBuf,
        /// Parser error with line and column.
        #[source]
        source: serde_json::Error,
    },

    /// A record parsed but describes an invalid task.
    #[error("invalid task record #{index} in {}: {source}", .path.display())]
    InvalidRecord {
        /// File being parsed.
        path: PathBuf,
        /// Zero-based position of the record in the file.
        index: usize,
        /// Validation failure.
        #[source]
        source: StoreError,
    },

    /// Failed to serialize tasks to JSON.
    #[error("failed to serialize tasks: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Another process holds the lock on the save file.
    #[error("save file is locked by another process: {}", .0.display())]
    Locked(PathBuf),
}

impl JsonStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error means the file content could not be understood.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::InvalidRecord { .. })
    }
}
