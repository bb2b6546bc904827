use serde::{Deserialize, Serialize};
use taskdeck_core::{LogEntry, Priority, StoreError, Task, TaskId};

/// On-disk shape of one task.
///
/// Compatibility is structural: fields added after the first file format
/// must be optional and default when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TaskRecord {
    name: String,
    description: String,
    priority: Priority,
    #[serde(default)]
    logs: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<TaskId>,
}

impl TaskRecord {
    pub(crate) fn into_task(self) -> Result<Task, StoreError> {
        Task::restore(
            self.id.unwrap_or_else(TaskId::new),
            self.name,
            self.description,
            self.priority,
            self.logs,
        )
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name().to_owned(),
            description: task.description().to_owned(),
            priority: task.priority(),
            logs: task.logs().to_vec(),
            id: Some(task.id()),
        }
    }
}
