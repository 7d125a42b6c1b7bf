use std::sync::mpsc::Receiver;

use crate::event::KeyChanged;

/// The trait that all key-value backends implement.
///
/// Values are opaque text. A successful `set` or `remove` is visible to
/// every later `get` before the matching [`KeyChanged`] event is delivered.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key` and notify subscribers.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value stored under `key` and notify subscribers.
    ///
    /// Removing a missing key is not an error and does not notify.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Subscribe to changes of a single key.
    fn subscribe(&self, key: &str) -> Receiver<KeyChanged>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn subscribe(&self, key: &str) -> Receiver<KeyChanged> {
        (**self).subscribe(key)
    }
}

/// Errors from a key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}
