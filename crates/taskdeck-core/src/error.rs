//! Error types for in-memory task store operations.

use thiserror::Error;

/// Errors that can occur while mutating a [`TaskStore`](crate::TaskStore).
///
/// Every variant is returned before any state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A required field is missing or has an invalid value.
    #[error("validation error: {0}")]
    Validation(String),

    /// No task matches the given name or id.
    #[error("task not found: {0}")]
    NotFound(String),

    /// A log position is outside the task's log list.
    #[error("log index {index} out of range (task has {len} log entries)")]
    IndexOutOfRange {
        /// Requested zero-based position.
        index: usize,
        /// Number of entries at the time of the call.
        len: usize,
    },

    /// Another task already uses the requested name and overwriting is disabled.
    #[error("a task named '{0}' already exists")]
    NameConflict(String),
}

impl StoreError {
    /// Shorthand for [`StoreError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for [`StoreError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
