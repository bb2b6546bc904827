//! JSON file storage for taskdeck.
//!
//! The whole task list lives in one pretty-printed JSON array. Saves replace
//! the file atomically (temp file in the same directory, fsync, rename), so a
//! failed write leaves the previous content in place.

mod error;
mod lock;
mod record;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use taskdeck_core::TaskStore;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub use error::JsonStoreError;
pub use lock::{SaveFileLock, SaveFileLockGuard};

use record::TaskRecord;

/// Default save file name, relative to the working directory.
pub const DEFAULT_SAVE_FILE: &str = "tasks.json";

const INDENT: &[u8] = b"    ";

/// Storage backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    locking: bool,
}

impl JsonStore {
    /// Store reading and writing `path`, with advisory locking enabled.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            locking: true,
        }
    }

    /// Enable or disable the advisory lock around save and load.
    #[must_use]
    pub const fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    /// Path of the save file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the save file with every task in `store`.
    ///
    /// # Errors
    /// Returns [`JsonStoreError::Io`] when the file cannot be written,
    /// [`JsonStoreError::Locked`] when another process holds the lock and
    /// [`JsonStoreError::Serialize`] if encoding fails.
    pub fn save(&self, store: &TaskStore) -> Result<(), JsonStoreError> {
        let records: Vec<TaskRecord> = store.iter().map(TaskRecord::from).collect();
        let bytes = encode(&records)?;

        let _guard = self.lock()?;
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|err| JsonStoreError::io(dir, err))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| JsonStoreError::io(dir, err))?;
        write_synced(&mut tmp, &bytes).map_err(|err| JsonStoreError::io(tmp.path(), err))?;
        tmp.persist(&self.path)
            .map_err(|err| JsonStoreError::io(&self.path, err.error))?;

        info!(path = %self.path.display(), tasks = records.len(), "Saved tasks");
        Ok(())
    }

    /// Read the save file into a fresh store.
    ///
    /// A missing file yields an empty store. An existing file must hold a
    /// JSON array; an empty one is a format error, not an empty store.
    ///
    /// # Errors
    /// Returns [`JsonStoreError::Format`] or [`JsonStoreError::InvalidRecord`]
    /// when the content is not a valid task list, [`JsonStoreError::Io`] when
    /// the file cannot be read and [`JsonStoreError::Locked`] on contention.
    pub fn load(&self) -> Result<TaskStore, JsonStoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No save file yet; starting empty");
            return Ok(TaskStore::new());
        }

        let _guard = self.lock()?;
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(TaskStore::new()),
            Err(err) => return Err(JsonStoreError::io(&self.path, err)),
        };
        let records: Vec<TaskRecord> =
            serde_json::from_str(&contents).map_err(|source| JsonStoreError::Format {
                path: self.path.clone(),
                source,
            })?;
        let tasks = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record.into_task().map_err(|source| JsonStoreError::InvalidRecord {
                    path: self.path.clone(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let store = TaskStore::from_tasks(tasks);
        info!(path = %self.path.display(), tasks = store.len(), "Loaded tasks");
        Ok(store)
    }

    fn lock(&self) -> Result<Option<SaveFileLockGuard>, JsonStoreError> {
        if !self.locking {
            return Ok(None);
        }
        SaveFileLock::try_acquire(&self.path).map(Some)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

fn encode(records: &[TaskRecord]) -> Result<Vec<u8>, JsonStoreError> {
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    records.serialize(&mut ser).map_err(JsonStoreError::Serialize)?;
    out.push(b'\n');
    Ok(out)
}

fn write_synced(tmp: &mut NamedTempFile, bytes: &[u8]) -> io::Result<()> {
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()
}
