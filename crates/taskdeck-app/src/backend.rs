//! Persistence seam used by [`TaskService`](crate::TaskService).

use anyhow::Error;
use taskdeck_core::TaskStore;
use taskdeck_store_json::{JsonStore, JsonStoreError};

/// Minimal storage abstraction required by [`TaskService`](crate::TaskService).
pub trait StoreBackend {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Read the full task collection.
    ///
    /// # Errors
    /// Returns a backend-specific error when the data cannot be read or parsed.
    fn load(&self) -> Result<TaskStore, Self::Error>;

    /// Replace the persisted collection with `store`.
    ///
    /// Implementations must leave the previous data intact on failure.
    ///
    /// # Errors
    /// Returns a backend-specific error when the data cannot be written.
    fn save(&self, store: &TaskStore) -> Result<(), Self::Error>;
}

impl StoreBackend for JsonStore {
    type Error = JsonStoreError;

    fn load(&self) -> Result<TaskStore, Self::Error> {
        Self::load(self)
    }

    fn save(&self, store: &TaskStore) -> Result<(), Self::Error> {
        Self::save(self, store)
    }
}

impl<B> StoreBackend for &B
where
    B: StoreBackend + ?Sized,
{
    type Error = B::Error;

    fn load(&self) -> Result<TaskStore, Self::Error> {
        (**self).load()
    }

    fn save(&self, store: &TaskStore) -> Result<(), Self::Error> {
        (**self).save(store)
    }
}
