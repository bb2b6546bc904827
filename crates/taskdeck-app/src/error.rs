//! Error type surfaced by [`TaskService`](crate::TaskService).

use taskdeck_core::StoreError;
use taskdeck_store_json::JsonStoreError;
use thiserror::Error;

/// Failure of a service operation. In-memory state is unchanged whenever one is returned.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store rejected the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The backend failed to load or save.
    #[error("storage error: {0}")]
    Backend(#[source] anyhow::Error),
}

/// Coarse classification for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid field.
    Validation,
    /// No task with that name.
    NotFound,
    /// Log position out of range.
    Index,
    /// Name already taken under the reject policy.
    Conflict,
    /// The save file exists but cannot be parsed.
    Format,
    /// Another process holds the save file lock.
    Locked,
    /// The save file cannot be read or written.
    Io,
}

impl ServiceError {
    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(StoreError::Validation(_)) => ErrorKind::Validation,
            Self::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            Self::Store(StoreError::IndexOutOfRange { .. }) => ErrorKind::Index,
            Self::Store(StoreError::NameConflict(_)) => ErrorKind::Conflict,
            Self::Backend(err) => match err.downcast_ref::<JsonStoreError>() {
                Some(JsonStoreError::Locked(_)) => ErrorKind::Locked,
                Some(json) if json.is_format_error() => ErrorKind::Format,
                _ => ErrorKind::Io,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    fn backend(err: JsonStoreError) -> ServiceError {
        ServiceError::Backend(err.into())
    }

    #[test]
    fn lock_contention_is_its_own_kind() {
        let err = backend(JsonStoreError::Locked(PathBuf::from("tasks.json")));
        assert_eq!(err.kind(), ErrorKind::Locked);
    }

    #[test]
    fn io_and_other_backend_failures_are_io() {
        let err = backend(JsonStoreError::Io {
            path: PathBuf::from("tasks.json"),
            source: io::Error::other("disk full"),
        });
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(
            ServiceError::Backend(anyhow::anyhow!("unknown")).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn format_failures_are_format() {
        let Err(source) = serde_json::from_str::<Vec<u8>>("") else {
            panic!("empty input must not parse");
        };
        let err = backend(JsonStoreError::Format {
            path: PathBuf::from("tasks.json"),
            source,
        });
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
