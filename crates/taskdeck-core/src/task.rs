use serde::Serialize;

use crate::error::StoreError;
use crate::id::TaskId;
use crate::log::LogEntry;
use crate::priority::Priority;

/// A named unit of work with a description, a priority and an ordered log history.
///
/// Fields are only mutated through [`TaskStore`](crate::TaskStore), which
/// keeps names unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    priority: Priority,
    logs: Vec<LogEntry>,
}

impl Task {
    /// Rebuild a task from persisted parts.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] when `name` is blank.
    pub fn restore(
        id: TaskId,
        name: String,
        description: String,
        priority: Priority,
        logs: Vec<LogEntry>,
    ) -> Result<Self, StoreError> {
        ensure_present("name", &name)?;
        Ok(Self {
            id,
            name,
            description,
            priority,
            logs,
        })
    }

    pub(crate) fn from_new(new: NewTask) -> Self {
        Self {
            id: TaskId::new(),
            name: new.name,
            description: new.description,
            priority: new.priority,
            logs: Vec::new(),
        }
    }

    /// Internal identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Unique display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Log entries in insertion order.
    #[must_use]
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub(crate) fn set_id(&mut self, id: TaskId) {
        self.id = id;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) const fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub(crate) const fn logs_mut(&mut self) -> &mut Vec<LogEntry> {
        &mut self.logs
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    name: String,
    description: String,
    priority: Priority,
}

impl NewTask {
    /// Validate raw user input.
    ///
    /// `priority` is matched case-insensitively against `High`, `Medium` and `Low`.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] when any field is blank or the priority is unknown.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: &str,
    ) -> Result<Self, StoreError> {
        let priority = priority.parse()?;
        Self::with_priority(name, description, priority)
    }

    /// Validate input whose priority is already typed.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] when the name or description is blank.
    pub fn with_priority(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        let description = description.into();
        ensure_present("name", &name)?;
        ensure_present("description", &description)?;
        Ok(Self {
            name,
            description,
            priority,
        })
    }

    /// Requested name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

pub(crate) fn ensure_present(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
