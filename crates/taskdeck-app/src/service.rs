use taskdeck_core::{LogEntry, NamePolicy, NewTask, Priority, StoreError, Task, TaskStore};
use time::Date;
use tracing::{info, warn};

use crate::backend::StoreBackend;
use crate::error::ServiceError;

/// Service façade that applies a mutation, persists it, and only then commits it in memory.
///
/// Each mutation runs against a working copy of the store. If the store
/// rejects it or the backend fails to save, the committed state is untouched.
pub struct TaskService<B> {
    backend: B,
    store: TaskStore,
}

impl<B: StoreBackend> TaskService<B> {
    /// Load the current state from `backend`.
    ///
    /// # Errors
    /// Returns [`ServiceError::Backend`] when loading fails.
    pub fn open(backend: B, policy: NamePolicy) -> Result<Self, ServiceError> {
        let mut store = backend.load().map_err(backend_error)?;
        store.set_policy(policy);
        Ok(Self { backend, store })
    }

    /// Committed state.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Borrow the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Tasks in priority order.
    #[must_use]
    pub fn list(&self) -> Vec<&Task> {
        self.store.list()
    }

    /// Look up a task by name.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when no task has that name.
    pub fn get(&self, name: &str) -> Result<&Task, ServiceError> {
        self.store
            .get(name)
            .ok_or_else(|| StoreError::not_found(format!("'{name}'")).into())
    }

    /// Create a task from raw input.
    ///
    /// # Errors
    /// Returns a validation error for blank fields or an unknown priority.
    pub fn create(&mut self, input: CreateTaskInput) -> Result<Task, ServiceError> {
        let CreateTaskInput {
            name,
            description,
            priority,
        } = input;
        let new = NewTask::new(name, description, &priority)?;
        let created = self.commit(|store| store.create(new))?;
        if let Some(replaced) = &created.replaced {
            warn!(task = replaced.name(), id = %replaced.id(), "Replaced existing task with the same name");
        }
        info!(task = created.task.name(), id = %created.task.id(), "Created task");
        Ok(created.task)
    }

    /// Apply a combined edit: description, priority and name in one save.
    ///
    /// # Errors
    /// Returns a validation, not-found or conflict error from the store, or a backend error.
    pub fn edit(&mut self, name: &str, edit: TaskEdit) -> Result<EditOutput, ServiceError> {
        let TaskEdit {
            new_name,
            description,
            priority,
        } = edit;
        let priority = priority.as_deref().map(str::parse::<Priority>).transpose()?;

        let output = self.commit(|store| {
            let id = store
                .update(name, description, priority)?
                .id();
            let displaced = match new_name.as_deref() {
                Some(new_name) => store.rename(id, new_name)?.displaced,
                None => None,
            };
            let task = store
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::not_found(id.to_string()))?;
            Ok(EditOutput { task, displaced })
        })?;

        if let Some(displaced) = &output.displaced {
            warn!(task = displaced.name(), id = %displaced.id(), "Rename overwrote another task");
        }
        info!(task = output.task.name(), id = %output.task.id(), "Updated task");
        Ok(output)
    }

    /// Rename a task.
    ///
    /// # Errors
    /// See [`TaskStore::rename`].
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<EditOutput, ServiceError> {
        self.edit(
            name,
            TaskEdit {
                new_name: Some(new_name.to_owned()),
                ..TaskEdit::default()
            },
        )
    }

    /// Change description and/or priority.
    ///
    /// # Errors
    /// See [`TaskStore::update`]; an unknown priority is a validation error.
    pub fn update(
        &mut self,
        name: &str,
        description: Option<String>,
        priority: Option<String>,
    ) -> Result<Task, ServiceError> {
        self.edit(
            name,
            TaskEdit {
                new_name: None,
                description,
                priority,
            },
        )
        .map(|output| output.task)
    }

    /// Delete a task and its logs.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when no task has that name.
    pub fn delete(&mut self, name: &str) -> Result<Task, ServiceError> {
        let removed = self.commit(|store| store.delete(name))?;
        info!(task = removed.name(), logs = removed.logs().len(), "Deleted task");
        Ok(removed)
    }

    /// Append a dated log entry; returns its position.
    ///
    /// # Errors
    /// Returns a validation error for blank text, or not-found.
    pub fn add_log(&mut self, name: &str, text: &str, date: Date) -> Result<usize, ServiceError> {
        ensure_text(text)?;
        let index = self.commit(|store| store.add_log(name, text, date))?;
        info!(task = name, index, "Added log entry");
        Ok(index)
    }

    /// Replace the text of a log entry, keeping its date.
    ///
    /// # Errors
    /// Returns a validation error for blank text, not-found, or an index error.
    pub fn edit_log(&mut self, name: &str, index: usize, text: &str) -> Result<LogEntry, ServiceError> {
        ensure_text(text)?;
        let entry = self.commit(|store| store.edit_log(name, index, text).cloned())?;
        info!(task = name, index, "Edited log entry");
        Ok(entry)
    }

    /// Replace a log entry wholesale with `"<date>: <text>"` (or undated text).
    ///
    /// # Errors
    /// Returns a validation error for blank input, not-found, or an index error.
    pub fn replace_log(&mut self, name: &str, index: usize, entry: &str) -> Result<LogEntry, ServiceError> {
        ensure_text(entry)?;
        let Ok(parsed) = entry.parse::<LogEntry>();
        let previous = self.commit(|store| store.replace_log(name, index, parsed))?;
        info!(task = name, index, "Replaced log entry");
        Ok(previous)
    }

    /// Remove a log entry; later entries shift down.
    ///
    /// # Errors
    /// Returns not-found or an index error.
    pub fn delete_log(&mut self, name: &str, index: usize) -> Result<LogEntry, ServiceError> {
        let removed = self.commit(|store| store.delete_log(name, index))?;
        info!(task = name, index, "Deleted log entry");
        Ok(removed)
    }

    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut TaskStore) -> Result<T, StoreError>,
    ) -> Result<T, ServiceError> {
        let mut next = self.store.clone();
        let output = mutate(&mut next)?;
        self.backend.save(&next).map_err(backend_error)?;
        self.store = next;
        Ok(output)
    }
}

fn backend_error<E: Into<anyhow::Error>>(err: E) -> ServiceError {
    ServiceError::Backend(err.into())
}

fn ensure_text(text: &str) -> Result<(), StoreError> {
    if text.trim().is_empty() {
        return Err(StoreError::validation("log text must not be empty"));
    }
    Ok(())
}

/// Raw input for [`TaskService::create`].
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: String,
    /// `High`, `Medium` or `Low`, any case.
    pub priority: String,
}

/// Fields to change in [`TaskService::edit`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    /// New name.
    pub new_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority, any case.
    pub priority: Option<String>,
}

/// Result of an edit.
#[derive(Debug, Clone)]
pub struct EditOutput {
    /// The task after the edit.
    pub task: Task,
    /// Another task that was overwritten by the rename.
    pub displaced: Option<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};
    use time::macros::date;

    #[derive(Default)]
    struct MockBackend {
        saved: RefCell<Vec<TaskStore>>,
        fail_next_save: Cell<bool>,
        initial: TaskStore,
    }

    impl StoreBackend for MockBackend {
        type Error = anyhow::Error;

        fn load(&self) -> Result<TaskStore, Self::Error> {
            Ok(self.initial.clone())
        }

        fn save(&self, store: &TaskStore) -> Result<(), Self::Error> {
            if self.fail_next_save.replace(false) {
                return Err(anyhow!("disk full"));
            }
            self.saved.borrow_mut().push(store.clone());
            Ok(())
        }
    }

    impl MockBackend {
        fn save_count(&self) -> usize {
            self.saved.borrow().len()
        }

        fn last_saved(&self) -> Option<TaskStore> {
            self.saved.borrow().last().cloned()
        }
    }

    fn input(name: &str, priority: &str) -> CreateTaskInput {
        CreateTaskInput {
            name: name.into(),
            description: "d".into(),
            priority: priority.into(),
        }
    }

    fn service() -> TaskService<MockBackend> {
        match TaskService::open(MockBackend::default(), NamePolicy::Overwrite) {
            Ok(service) => service,
            Err(err) => panic!("mock backend must load: {err}"),
        }
    }

    fn names(service: &TaskService<MockBackend>) -> Vec<String> {
        service.list().iter().map(|task| task.name().to_owned()).collect()
    }

    #[test]
    fn every_mutation_is_saved_before_returning() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "Low"))?;
        svc.add_log("A", "x", date!(2024 - 01 - 01))?;
        svc.edit_log("A", 0, "y")?;
        svc.replace_log("A", 0, "2024-01-02: z")?;
        svc.delete_log("A", 0)?;
        svc.update("A", None, Some("high".into()))?;
        svc.rename("A", "B")?;
        svc.delete("B")?;
        assert_eq!(svc.backend().save_count(), 8);
        assert_eq!(svc.backend().last_saved(), Some(svc.store().clone()));
        Ok(())
    }

    #[test]
    fn create_then_list_is_priority_sorted() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "Low"))?;
        svc.create(input("B", "High"))?;
        svc.create(input("C", "Medium"))?;
        assert_eq!(names(&svc), vec!["B", "C", "A"]);
        Ok(())
    }

    #[test]
    fn invalid_create_inserts_nothing_and_saves_nothing() {
        let mut svc = service();
        let err = svc.create(input("A", "")).err().map(|err| err.kind());
        assert_eq!(err, Some(ErrorKind::Validation));
        let err = svc.create(input("A", "soon")).err().map(|err| err.kind());
        assert_eq!(err, Some(ErrorKind::Validation));
        assert!(svc.store().is_empty());
        assert_eq!(svc.backend().save_count(), 0);
    }

    #[test]
    fn failed_save_keeps_previous_state() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "Low"))?;
        let before = svc.store().clone();

        svc.backend().fail_next_save.set(true);
        let Err(err) = svc.add_log("A", "lost", date!(2024 - 01 - 01)) else {
            panic!("save failure must surface");
        };
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(svc.store(), &before);
        Ok(())
    }

    #[test]
    fn blank_log_text_is_rejected() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "Low"))?;
        let Err(err) = svc.add_log("A", "  ", date!(2024 - 01 - 01)) else {
            panic!("blank text must be rejected");
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(svc.get("A")?.logs().is_empty());
        Ok(())
    }

    #[test]
    fn error_kinds_match_failure() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "Low"))?;
        let kind = |result: Result<LogEntry, ServiceError>| result.err().map(|err| err.kind());
        assert_eq!(kind(svc.delete_log("A", 0)), Some(ErrorKind::Index));
        assert_eq!(kind(svc.delete_log("Z", 0)), Some(ErrorKind::NotFound));
        assert_eq!(
            svc.delete("Z").err().map(|err| err.kind()),
            Some(ErrorKind::NotFound)
        );
        Ok(())
    }

    #[test]
    fn edit_applies_all_fields_in_one_save() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "Low"))?;
        svc.add_log("A", "kept", date!(2024 - 06 - 01))?;
        let saves = svc.backend().save_count();

        let output = svc.edit(
            "A",
            TaskEdit {
                new_name: Some("A2".into()),
                description: Some("updated".into()),
                priority: Some("MEDIUM".into()),
            },
        )?;
        assert_eq!(svc.backend().save_count(), saves + 1);
        assert_eq!(output.task.name(), "A2");
        assert_eq!(output.task.description(), "updated");
        assert_eq!(output.task.priority(), Priority::Medium);
        assert_eq!(output.task.logs().len(), 1);
        assert!(output.displaced.is_none());
        Ok(())
    }

    #[test]
    fn edit_with_bad_priority_changes_nothing() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "Low"))?;
        let before = svc.store().clone();
        let Err(err) = svc.update("A", Some("new".into()), Some("asap".into())) else {
            panic!("unknown priority must fail");
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(svc.store(), &before);
        Ok(())
    }

    #[test]
    fn rename_collision_follows_policy() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "High"))?;
        svc.create(input("B", "Low"))?;
        let output = svc.rename("A", "B")?;
        assert_eq!(output.displaced.map(|task| task.priority()), Some(Priority::Low));
        assert_eq!(names(&svc), vec!["B"]);

        let mut strict = match TaskService::open(MockBackend::default(), NamePolicy::Reject) {
            Ok(service) => service,
            Err(err) => panic!("mock backend must load: {err}"),
        };
        strict.create(input("A", "High"))?;
        strict.create(input("B", "Low"))?;
        let Err(err) = strict.rename("A", "B") else {
            panic!("collision must be rejected");
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let Err(err) = strict.create(input("A", "Low")) else {
            panic!("duplicate create must be rejected");
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(strict.store().len(), 2);
        Ok(())
    }

    #[test]
    fn edit_log_keeps_date_and_replace_log_parses_it() -> Result<(), ServiceError> {
        let mut svc = service();
        svc.create(input("A", "Low"))?;
        svc.add_log("A", "draft", date!(2024 - 07 - 01))?;

        let edited = svc.edit_log("A", 0, "final")?;
        assert_eq!(edited.to_string(), "2024-07-01: final");

        let previous = svc.replace_log("A", 0, "2024-07-02: moved")?;
        assert_eq!(previous.to_string(), "2024-07-01: final");
        assert_eq!(svc.get("A")?.logs()[0].date(), Some(date!(2024 - 07 - 02)));
        Ok(())
    }
}
