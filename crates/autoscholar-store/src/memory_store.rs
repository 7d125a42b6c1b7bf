use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;
use std::sync::Mutex;

use crate::event::{ChangeNotifier, KeyChanged};
use crate::store::{KeyValueStore, StoreError};

/// In-memory key-value backend.
///
/// Stands in for host storage in tests and embedded use. An optional quota
/// bounds the total size of keys plus values, the way browser storage does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
    notifier: ChangeNotifier,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes growing it beyond `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Seed a raw value without notifying subscribers.
    pub fn insert_raw(&self, key: &str, value: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key.to_string(), value.to_string());
    }

    /// Total bytes currently held (keys plus values).
    pub fn used_bytes(&self) -> usize {
        match self.entries.lock() {
            Ok(entries) => footprint(&entries),
            Err(poisoned) => footprint(&poisoned.into_inner()),
        }
    }
}

fn footprint(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
            if let Some(quota) = self.quota {
                let current = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
                let needed = footprint(&entries) - current + key.len() + value.len();
                if needed > quota {
                    return Err(StoreError::QuotaExceeded { needed, quota });
                }
            }
            entries.insert(key.to_string(), value.to_string());
        }
        self.notifier.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = {
            let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
            entries.remove(key).is_some()
        };
        if removed {
            self.notifier.notify(key);
        }
        Ok(())
    }

    fn subscribe(&self, key: &str) -> Receiver<KeyChanged> {
        self.notifier.subscribe(key)
    }
}
