use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

use crate::error::StoreError;
use crate::id::TaskId;
use crate::log::LogEntry;
use crate::priority::Priority;
use crate::task::{NewTask, Task, ensure_present};

/// What to do when a create or rename targets a name another task already uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
    /// The existing task is replaced and handed back to the caller.
    #[default]
    Overwrite,
    /// The operation fails with [`StoreError::NameConflict`].
    Reject,
}

/// Address of a task: its current name or its internal id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRef<'a> {
    /// Match by display name.
    Name(&'a str),
    /// Match by internal id.
    Id(TaskId),
}

impl<'a> From<&'a str> for TaskRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for TaskRef<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<TaskId> for TaskRef<'_> {
    fn from(id: TaskId) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for TaskRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "'{name}'"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Outcome of [`TaskStore::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// The task as inserted.
    pub task: Task,
    /// Task previously stored under the same name, if any.
    pub replaced: Option<Task>,
}

/// Outcome of [`TaskStore::rename`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    /// Id of the renamed task.
    pub task: TaskId,
    /// Name before the rename.
    pub old_name: String,
    /// Different task that used the new name and was overwritten.
    pub displaced: Option<Task>,
}

/// In-memory collection of tasks, the single source of truth during a run.
///
/// Tasks are kept in insertion order; [`TaskStore::list`] derives the
/// priority view from it with a stable sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
    policy: NamePolicy,
}

impl TaskStore {
    /// Empty store with the default overwrite policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from tasks read in order.
    ///
    /// A later task with an already-seen name replaces the earlier one in its
    /// position. A repeated id is replaced with a fresh one.
    #[must_use]
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut store = Self::new();
        for mut task in tasks {
            if let Some(pos) = store.position_by_name(task.name()) {
                if store.position_by_id(task.id()).is_some_and(|other| other != pos) {
                    task.set_id(TaskId::new());
                }
                store.tasks[pos] = task;
                continue;
            }
            if store.position_by_id(task.id()).is_some() {
                task.set_id(TaskId::new());
            }
            store.tasks.push(task);
        }
        store
    }

    /// Change the collision policy.
    pub const fn set_policy(&mut self, policy: NamePolicy) {
        self.policy = policy;
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Names in insertion order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(Task::name)
    }

    /// Look up a task.
    #[must_use]
    pub fn get<'a>(&self, task: impl Into<TaskRef<'a>>) -> Option<&Task> {
        self.position(task.into()).map(|pos| &self.tasks[pos])
    }

    /// Every task sorted High, Medium, Low; ties keep insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<&Task> {
        let mut sorted: Vec<&Task> = self.tasks.iter().collect();
        sorted.sort_by_key(|task| task.priority());
        sorted
    }

    /// Insert a new task.
    ///
    /// Under [`NamePolicy::Overwrite`] a task with the same name is replaced in
    /// place and returned in [`Created::replaced`].
    ///
    /// # Errors
    /// Returns [`StoreError::NameConflict`] when the name is taken and the
    /// policy is [`NamePolicy::Reject`].
    pub fn create(&mut self, new: NewTask) -> Result<Created, StoreError> {
        let existing = self.position_by_name(new.name());
        if existing.is_some() && self.policy == NamePolicy::Reject {
            return Err(StoreError::NameConflict(new.name().to_owned()));
        }
        let task = Task::from_new(new);
        let replaced = match existing {
            Some(pos) => Some(std::mem::replace(&mut self.tasks[pos], task.clone())),
            None => {
                self.tasks.push(task.clone());
                None
            }
        };
        Ok(Created { task, replaced })
    }

    /// Give a task a new name.
    ///
    /// A task renamed to a free name moves to the end of insertion order. A
    /// task renamed onto another task's name takes that task's position; the
    /// other task is dropped and returned in [`Renamed::displaced`].
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] for a blank name,
    /// [`StoreError::NotFound`] when the task is missing and
    /// [`StoreError::NameConflict`] on collision under [`NamePolicy::Reject`].
    pub fn rename<'a>(
        &mut self,
        task: impl Into<TaskRef<'a>>,
        new_name: &str,
    ) -> Result<Renamed, StoreError> {
        ensure_present("name", new_name)?;
        let pos = self.require(task.into())?;
        let id = self.tasks[pos].id();
        let old_name = self.tasks[pos].name().to_owned();
        if old_name == new_name {
            return Ok(Renamed {
                task: id,
                old_name,
                displaced: None,
            });
        }

        let collision = self.position_by_name(new_name);
        if collision.is_some() && self.policy == NamePolicy::Reject {
            return Err(StoreError::NameConflict(new_name.to_owned()));
        }

        let mut moved = self.tasks.remove(pos);
        moved.set_name(new_name.to_owned());
        let displaced = match collision {
            Some(other) => {
                let other = if other > pos { other - 1 } else { other };
                Some(std::mem::replace(&mut self.tasks[other], moved))
            }
            None => {
                self.tasks.push(moved);
                None
            }
        };
        Ok(Renamed {
            task: id,
            old_name,
            displaced,
        })
    }

    /// Change description and/or priority in place. Logs are untouched.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] for a blank description and
    /// [`StoreError::NotFound`] when the task is missing.
    pub fn update<'a>(
        &mut self,
        task: impl Into<TaskRef<'a>>,
        description: Option<String>,
        priority: Option<Priority>,
    ) -> Result<&Task, StoreError> {
        if let Some(description) = &description {
            ensure_present("description", description)?;
        }
        let pos = self.require(task.into())?;
        let target = &mut self.tasks[pos];
        if let Some(description) = description {
            target.set_description(description);
        }
        if let Some(priority) = priority {
            target.set_priority(priority);
        }
        Ok(&*target)
    }

    /// Remove a task together with its logs.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when the task is missing.
    pub fn delete<'a>(&mut self, task: impl Into<TaskRef<'a>>) -> Result<Task, StoreError> {
        let pos = self.require(task.into())?;
        Ok(self.tasks.remove(pos))
    }

    /// Append a dated entry and return its position.
    ///
    /// The text is stored as given.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when the task is missing.
    pub fn add_log<'a>(
        &mut self,
        task: impl Into<TaskRef<'a>>,
        text: impl Into<String>,
        date: Date,
    ) -> Result<usize, StoreError> {
        let pos = self.require(task.into())?;
        let logs = self.tasks[pos].logs_mut();
        logs.push(LogEntry::new(date, text));
        Ok(logs.len() - 1)
    }

    /// Replace the text of one entry, keeping its date.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] or [`StoreError::IndexOutOfRange`].
    pub fn edit_log<'a>(
        &mut self,
        task: impl Into<TaskRef<'a>>,
        index: usize,
        text: impl Into<String>,
    ) -> Result<&LogEntry, StoreError> {
        let entry = self.log_mut(task.into(), index)?;
        entry.set_text(text);
        Ok(&*entry)
    }

    /// Replace one entry wholesale and return the previous value.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] or [`StoreError::IndexOutOfRange`].
    pub fn replace_log<'a>(
        &mut self,
        task: impl Into<TaskRef<'a>>,
        index: usize,
        entry: LogEntry,
    ) -> Result<LogEntry, StoreError> {
        let slot = self.log_mut(task.into(), index)?;
        Ok(std::mem::replace(slot, entry))
    }

    /// Remove one entry; later entries shift down by one.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] or [`StoreError::IndexOutOfRange`].
    pub fn delete_log<'a>(
        &mut self,
        task: impl Into<TaskRef<'a>>,
        index: usize,
    ) -> Result<LogEntry, StoreError> {
        let pos = self.require(task.into())?;
        let logs = self.tasks[pos].logs_mut();
        check_index(index, logs.len())?;
        Ok(logs.remove(index))
    }

    fn log_mut(&mut self, task: TaskRef<'_>, index: usize) -> Result<&mut LogEntry, StoreError> {
        let pos = self.require(task)?;
        let logs = self.tasks[pos].logs_mut();
        check_index(index, logs.len())?;
        Ok(&mut logs[index])
    }

    fn require(&self, task: TaskRef<'_>) -> Result<usize, StoreError> {
        self.position(task)
            .ok_or_else(|| StoreError::not_found(task.to_string()))
    }

    fn position(&self, task: TaskRef<'_>) -> Option<usize> {
        match task {
            TaskRef::Name(name) => self.position_by_name(name),
            TaskRef::Id(id) => self.position_by_id(id),
        }
    }

    fn position_by_name(&self, name: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.name() == name)
    }

    fn position_by_id(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }
}

const fn check_index(index: usize, len: usize) -> Result<(), StoreError> {
    if index < len {
        Ok(())
    } else {
        Err(StoreError::IndexOutOfRange { index, len })
    }
}
