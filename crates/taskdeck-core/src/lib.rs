//! Domain types and the in-memory task store for taskdeck.
//!
//! The store is a plain value: it never touches the filesystem. Callers apply
//! a mutation and then persist the result themselves.

/// Store error types.
pub mod error;
/// Identifier types.
pub mod id;
/// Dated log entries.
pub mod log;
/// Task priority.
pub mod priority;
/// The task collection and its operations.
pub mod store;
/// Task entity and validated creation input.
pub mod task;

pub use error::StoreError;
pub use id::TaskId;
pub use log::{DATE_FORMAT, LogEntry, format_date, parse_date};
pub use priority::Priority;
pub use store::{Created, NamePolicy, Renamed, TaskRef, TaskStore};
pub use task::{NewTask, Task};
