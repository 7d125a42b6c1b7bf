//! The persisted profile document

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::lenient::opt_loose_string;
use crate::profile::Profile;

/// All profiles plus the active-profile pointer, persisted as one unit.
///
/// `active_profile_id` names a key of `profiles`, and is `None` only when
/// `profiles` is empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub active_profile_id: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Document {
    /// Document holding a single profile, which is active.
    pub fn with_single_profile(profile: Profile) -> Self {
        let id = profile.id.clone();
        let mut profiles = BTreeMap::new();
        profiles.insert(id.clone(), profile);
        Self {
            active_profile_id: Some(id),
            profiles,
        }
    }

    /// The active profile.
    ///
    /// Fails with [`ProfileError::IntegrityViolation`] when the pointer
    /// names no stored profile, and with [`ProfileError::NoActiveProfile`]
    /// when the document is empty.
    pub fn active_profile(&self) -> Result<&Profile> {
        match &self.active_profile_id {
            Some(id) => self
                .profiles
                .get(id)
                .ok_or_else(|| ProfileError::IntegrityViolation {
                    active_id: Some(id.clone()),
                }),
            None => Err(self.missing_active()),
        }
    }

    /// Mutable access to the active profile, with the same failure modes.
    pub fn active_profile_mut(&mut self) -> Result<&mut Profile> {
        let Some(id) = self.active_profile_id.clone() else {
            return Err(self.missing_active());
        };
        self.profiles
            .get_mut(&id)
            .ok_or(ProfileError::IntegrityViolation { active_id: Some(id) })
    }

    fn missing_active(&self) -> ProfileError {
        if self.profiles.is_empty() {
            ProfileError::NoActiveProfile
        } else {
            ProfileError::IntegrityViolation { active_id: None }
        }
    }

    /// Fresh identifier derived from the current time in milliseconds,
    /// bumped until it is not already a key.
    pub fn generate_id(&self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        while self.profiles.contains_key(&millis.to_string()) {
            millis += 1;
        }
        millis.to_string()
    }

    /// Remove a profile, re-pointing the active selection if it was active.
    ///
    /// Returns the removed profile.
    pub fn remove_profile(&mut self, id: &str) -> Option<Profile> {
        let removed = self.profiles.remove(id)?;
        if self.active_profile_id.as_deref() == Some(id) {
            self.active_profile_id = self.profiles.keys().next().cloned();
        }
        Some(removed)
    }

    /// Force every profile's `id` to equal its key.
    pub(crate) fn align_profile_ids(&mut self) {
        for (key, profile) in self.profiles.iter_mut() {
            if profile.id != *key {
                profile.id = key.clone();
            }
        }
    }
}
