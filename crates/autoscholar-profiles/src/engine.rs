//! Store engine: loads, migrates and persists the profile document
//!
//! Every operation reads the whole document, mutates a copy and writes the
//! whole document back. The backend's change channel tells other consumers
//! of the same key to re-read.

use std::sync::mpsc::Receiver;

use autoscholar_store::{KeyChanged, KeyValueStore};
use tracing::{debug, error, info, warn};

use crate::config::ProfileStoreConfig;
use crate::document::Document;
use crate::error::Result;
use crate::migration::{self, Decoded};
use crate::profile::Profile;

/// Profile store bound to one key of a key-value backend.
pub struct ProfileStore<S> {
    backend: S,
    config: ProfileStoreConfig,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Create a store with default settings
    pub fn new(backend: S) -> Self {
        Self::with_config(backend, ProfileStoreConfig::default())
    }

    pub fn with_config(backend: S, config: ProfileStoreConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn config(&self) -> &ProfileStoreConfig {
        &self.config
    }

    /// Receive one event per successful write of the document.
    pub fn subscribe(&self) -> Receiver<KeyChanged> {
        self.backend.subscribe(&self.config.storage_key)
    }

    /// Current document, migrated to the multi-profile shape.
    ///
    /// Never fails: missing or corrupted data is replaced by a fresh
    /// document with one default profile. Bootstrap and migration results
    /// are persisted; a failure to persist them is logged only. When the
    /// backend cannot be read at all, the fresh document is returned
    /// without being persisted so the stored value is left untouched.
    pub fn read(&self) -> Document {
        match self.try_read() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(key = %self.config.storage_key, "Using unsaved default profiles: {}", e);
                self.default_document()
            }
        }
    }

    /// Like [`read`](Self::read), but a backend read error is returned
    /// instead of being papered over.
    pub fn try_read(&self) -> Result<Document> {
        let Some(raw) = self.load_raw()? else {
            return Ok(self.bootstrap());
        };

        let max_history = self.config.max_history;
        match migration::decode(&raw, max_history, || Document::default().generate_id()) {
            Ok(Decoded::Current(doc)) => Ok(doc),
            Ok(Decoded::Migrated(doc)) => {
                info!(
                    profile_id = doc.active_profile_id.as_deref().unwrap_or_default(),
                    "Migrated legacy single-profile data"
                );
                self.persist_quietly(&doc);
                Ok(doc)
            }
            Err(e) => {
                warn!(key = %self.config.storage_key, "Discarding stored profiles: {}", e);
                Ok(self.bootstrap())
            }
        }
    }

    /// Serialize and persist the whole document, then broadcast a change.
    pub fn write(&self, doc: &Document) -> Result<()> {
        let encoded = serde_json::to_string(doc)?;
        self.backend
            .set(&self.config.storage_key, &encoded)
            .map_err(|e| {
                error!(key = %self.config.storage_key, "Failed to write profiles: {}", e);
                e
            })?;
        debug!(
            bytes = encoded.len(),
            profiles = doc.profiles.len(),
            "Saved profiles"
        );
        Ok(())
    }

    /// Active profile of `doc`; see [`Document::active_profile`].
    pub fn get_active<'a>(&self, doc: &'a Document) -> Result<&'a Profile> {
        doc.active_profile()
    }

    /// Read, apply `mutate` to the document, and write it back.
    ///
    /// Nothing is written when `mutate` fails or the backend cannot be read.
    pub(crate) fn modify<T>(&self, mutate: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let mut doc = self.try_read()?;
        let out = mutate(&mut doc)?;
        self.write(&doc)?;
        Ok(out)
    }

    fn load_raw(&self) -> Result<Option<String>> {
        let raw = self.backend.get(&self.config.storage_key).map_err(|e| {
            error!(key = %self.config.storage_key, "Failed to read stored profiles: {}", e);
            e
        })?;
        Ok(raw.filter(|raw| !raw.trim().is_empty()))
    }

    fn default_document(&self) -> Document {
        let id = Document::default().generate_id();
        Document::with_single_profile(Profile::new(id, self.config.default_profile_name.clone()))
    }

    fn bootstrap(&self) -> Document {
        let doc = self.default_document();
        info!(
            profile_id = doc.active_profile_id.as_deref().unwrap_or_default(),
            "Created default profile"
        );
        self.persist_quietly(&doc);
        doc
    }

    fn persist_quietly(&self, doc: &Document) {
        // write() already logged the failure
        let _ = self.write(doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoscholar_store::MemoryStore;

    #[test]
    fn read_bootstraps_empty_storage() {
        let store = ProfileStore::new(MemoryStore::new());
        let rx = store.subscribe();

        let doc = store.read();
        let active = store.get_active(&doc).unwrap();
        assert_eq!(doc.profiles.len(), 1);
        assert_eq!(active.name, "New User");
        assert!(active.saved_papers.is_empty());
        assert!(active.search_history.is_empty());
        assert_eq!(rx.try_iter().count(), 1);

        // Second read finds the persisted document
        assert_eq!(store.read(), doc);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn read_recovers_from_garbage() {
        let backend = MemoryStore::new();
        backend.insert_raw("autoscolar_profiles_v1", "{{{ not json");
        let store = ProfileStore::new(backend);

        let doc = store.read();
        assert_eq!(doc.profiles.len(), 1);
        let stored = store.backend().get("autoscolar_profiles_v1").unwrap().unwrap();
        assert!(stored.contains("activeProfileId"));
    }

    #[test]
    fn read_survives_write_failure() {
        let store = ProfileStore::new(MemoryStore::with_quota(8));
        let doc = store.read();
        assert_eq!(doc.profiles.len(), 1);
        assert_eq!(store.backend().get("autoscolar_profiles_v1").unwrap(), None);
    }

    #[test]
    fn write_failure_is_returned() {
        let store = ProfileStore::new(MemoryStore::with_quota(8));
        let rx = store.subscribe();
        let doc = Document::with_single_profile(Profile::new("1", "Ada"));
        assert!(store.write(&doc).is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn custom_storage_key_is_used() {
        let config = ProfileStoreConfig {
            storage_key: "test_profiles".into(),
            default_profile_name: "Guest".into(),
            ..ProfileStoreConfig::default()
        };
        let store = ProfileStore::with_config(MemoryStore::new(), config);
        let doc = store.read();
        assert_eq!(doc.active_profile().unwrap().name, "Guest");
        assert!(store.backend().get("test_profiles").unwrap().is_some());
        assert!(store.backend().get("autoscolar_profiles_v1").unwrap().is_none());
    }
}
