//! Profile operations consumed by the presentation layer
//!
//! Each operation is read, mutate in memory, write. Operations that report
//! `Ok(false)` for an unknown profile write nothing and broadcast nothing.
//! A backend read error fails the operation before anything is written.

use std::collections::BTreeMap;

use autoscholar_store::KeyValueStore;
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::engine::ProfileStore;
use crate::error::Result;
use crate::history::{normalize_query, record_query, HistoryEntry};
use crate::paper::SavedPaperRecord;
use crate::profile::{Profile, ProfilePatch};

impl<S: KeyValueStore> ProfileStore<S> {
    // ==================== Profiles ====================

    /// All stored profiles keyed by id.
    pub fn profiles(&self) -> BTreeMap<String, Profile> {
        self.read().profiles
    }

    /// The active profile.
    pub fn active_profile(&self) -> Result<Profile> {
        self.try_read()?.active_profile().cloned()
    }

    /// Create a profile from defaults overlaid with `data` and make it active.
    ///
    /// Uses `data.id` when given, otherwise a fresh time-derived id. An
    /// existing profile with the same id is replaced.
    pub fn create_profile(&self, data: ProfilePatch) -> Result<Profile> {
        let default_name = self.config().default_profile_name.clone();
        let max_history = self.config().max_history;

        let profile = self.modify(|doc| {
            let id = match data.target_id() {
                Some(id) => id.to_string(),
                None => doc.generate_id(),
            };
            let mut profile = Profile::new(id.clone(), default_name);
            data.apply_to(&mut profile, max_history);

            doc.profiles.insert(id.clone(), profile.clone());
            doc.active_profile_id = Some(id);
            Ok(profile)
        })?;

        info!(profile_id = %profile.id, "Created profile");
        Ok(profile)
    }

    /// Make `id` the active profile. Returns false if no such profile exists.
    pub fn set_active_profile(&self, id: &str) -> Result<bool> {
        let mut doc = self.try_read()?;
        if !doc.profiles.contains_key(id) {
            return Ok(false);
        }
        doc.active_profile_id = Some(id.to_string());
        self.write(&doc)?;
        Ok(true)
    }

    /// Shallow-merge `patch` onto the profile named by `patch.id`, creating
    /// the profile when it does not exist yet.
    ///
    /// Returns false, writing nothing, when the patch carries no id.
    pub fn update_profile(&self, patch: ProfilePatch) -> Result<bool> {
        let Some(id) = patch.target_id().map(str::to_string) else {
            return Ok(false);
        };
        let default_name = self.config().default_profile_name.clone();
        let max_history = self.config().max_history;

        self.modify(|doc| {
            let profile = doc
                .profiles
                .entry(id.clone())
                .or_insert_with(|| Profile::new(id.clone(), default_name));
            patch.apply_to(profile, max_history);
            if doc.active_profile_id.is_none() {
                doc.active_profile_id = Some(id);
            }
            Ok(())
        })?;
        Ok(true)
    }

    /// Delete a profile. If it was active another remaining profile becomes
    /// active, or none when the store is left empty.
    pub fn delete_profile(&self, id: &str) -> Result<bool> {
        let mut doc = self.try_read()?;
        if doc.remove_profile(id).is_none() {
            return Ok(false);
        }
        self.write(&doc)?;
        info!(
            profile_id = id,
            active = doc.active_profile_id.as_deref().unwrap_or("none"),
            "Deleted profile"
        );
        Ok(true)
    }

    // ==================== Saved papers ====================

    /// Saved papers of the active profile, newest first.
    pub fn saved_papers(&self) -> Result<Vec<SavedPaperRecord>> {
        Ok(self.active_profile()?.saved_papers)
    }

    /// Whether the active profile has saved a paper with this identifier.
    pub fn is_paper_saved(&self, id: &str) -> Result<bool> {
        if id.is_empty() {
            return Ok(false);
        }
        Ok(self.try_read()?.active_profile()?.is_saved(id))
    }

    /// Flip the saved state of an external paper on the active profile.
    ///
    /// Returns the new state: true when the paper is now saved. Papers with
    /// no derivable identity are never saved and cause no write.
    pub fn toggle_saved_paper(&self, paper: &Value) -> Result<bool> {
        let Some(record) = SavedPaperRecord::from_external(paper, self.config().max_authors)
        else {
            warn!("Ignoring paper without id, paper_id, doi or title");
            return Ok(false);
        };

        self.modify(|doc| {
            let profile = doc.active_profile_mut()?;
            if profile.is_saved(&record.id) {
                profile.saved_papers.retain(|p| !p.matches_id(&record.id));
                Ok(false)
            } else {
                profile.saved_papers.insert(0, record);
                Ok(true)
            }
        })
    }

    /// Empty the active profile's saved papers.
    pub fn clear_saved_papers(&self) -> Result<()> {
        self.modify(|doc| {
            doc.active_profile_mut()?.saved_papers.clear();
            Ok(())
        })
    }

    // ==================== Search history ====================

    /// Search history of the active profile, newest first.
    pub fn search_history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.active_profile()?.search_history)
    }

    /// Record a search on the active profile.
    ///
    /// Blank queries are ignored. A repeated query moves to the front.
    /// Returns whether anything was recorded.
    pub fn add_search_history(&self, query: &str) -> Result<bool> {
        let Some(query) = normalize_query(query) else {
            return Ok(false);
        };
        let max_history = self.config().max_history;

        self.modify(|doc| {
            let profile = doc.active_profile_mut()?;
            record_query(
                &mut profile.search_history,
                HistoryEntry::new(query, Utc::now()),
                max_history,
            );
            Ok(())
        })?;
        Ok(true)
    }

    /// Empty the active profile's search history.
    pub fn clear_search_history(&self) -> Result<()> {
        self.modify(|doc| {
            doc.active_profile_mut()?.search_history.clear();
            Ok(())
        })
    }
}
