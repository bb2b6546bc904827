//! Application layer logic for taskdeck.
//!
//! This crate ties the in-memory store to its persistence backend and loads
//! project configuration. Front ends talk to [`TaskService`] only.

pub mod backend;
pub mod config;
pub mod error;
pub mod service;

// Re-exports for convenience
pub use backend::StoreBackend;
pub use config::{NamePolicy, NamesConfig, ProjectConfig};
pub use error::{ErrorKind, ServiceError};
pub use service::{CreateTaskInput, EditOutput, TaskEdit, TaskService};
pub use taskdeck_store_json::JsonStore;

/// Open the service described by `config`, loading the save file.
///
/// # Errors
/// Returns [`ServiceError::Backend`] when the save file cannot be loaded.
pub fn open_service(config: &ProjectConfig) -> Result<TaskService<JsonStore>, ServiceError> {
    TaskService::open(config.json_store(), config.name_policy())
}
