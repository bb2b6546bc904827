use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::JsonStoreError;

/// Guard representing a held save-file lock. The lock is released when dropped.
#[derive(Debug)]
pub struct SaveFileLockGuard {
    file: File,
    path: PathBuf,
}

impl SaveFileLockGuard {
    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SaveFileLockGuard {
    fn drop(&mut self) {
        if let Err(err) = fs2::FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), %err, "Failed to release save file lock");
        }
    }
}

/// Advisory, exclusive lock on a sibling `<save file>.lock`.
pub struct SaveFileLock;

impl SaveFileLock {
    /// Lock file path used for `save_file`.
    #[must_use]
    pub fn lock_path(save_file: &Path) -> PathBuf {
        let mut name = save_file
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        name.push(".lock");
        save_file.with_file_name(name)
    }

    /// Take the lock without blocking.
    ///
    /// # Errors
    /// Returns [`JsonStoreError::Locked`] when another handle holds the lock
    /// and [`JsonStoreError::Io`] when the lock file cannot be opened.
    pub fn try_acquire(save_file: &Path) -> Result<SaveFileLockGuard, JsonStoreError> {
        let path = Self::lock_path(save_file);
        let file = Self::open_lock_file(&path).map_err(|err| JsonStoreError::io(&path, err))?;
        match fs2::FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                debug!(path = %path.display(), "Acquired save file lock");
                Ok(SaveFileLockGuard { file, path })
            }
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                Err(JsonStoreError::Locked(path))
            }
            Err(err) => Err(JsonStoreError::io(path, err)),
        }
    }

    fn open_lock_file(path: &Path) -> io::Result<File> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lock_path_is_a_sibling() {
        let path = SaveFileLock::lock_path(Path::new("data/tasks.json"));
        assert_eq!(path, PathBuf::from("data/tasks.json.lock"));
    }

    #[test]
    fn second_holder_is_refused_until_release() -> Result<(), JsonStoreError> {
        let dir = tempdir().map_err(|err| JsonStoreError::io("tempdir", err))?;
        let save_file = dir.path().join("tasks.json");

        let first = SaveFileLock::try_acquire(&save_file)?;
        assert!(first.path().exists());
        assert!(matches!(
            SaveFileLock::try_acquire(&save_file),
            Err(JsonStoreError::Locked(_))
        ));

        drop(first);
        let _second = SaveFileLock::try_acquire(&save_file)?;
        Ok(())
    }
}
