//! Profile domain model

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::history::{dedup_history, HistoryEntry};
use crate::lenient::{loose_string, null_default, opt_loose_string, string_list};
use crate::paper::SavedPaperRecord;

/// One user's identity, interests, saved papers and search history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub email: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub institution: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub bio: String,
    #[serde(default, deserialize_with = "string_list")]
    pub interests: Vec<String>,
    /// Newest first, unique by id
    #[serde(default, deserialize_with = "null_default")]
    pub saved_papers: Vec<SavedPaperRecord>,
    /// Newest first, unique by trimmed query, bounded
    #[serde(default, deserialize_with = "null_default")]
    pub search_history: Vec<HistoryEntry>,

    /// Fields written by other consumers, kept as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Profile {
    /// Create an empty profile
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            institution: String::new(),
            bio: String::new(),
            interests: Vec::new(),
            saved_papers: Vec::new(),
            search_history: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Saved paper with the given identifier, if any.
    pub fn saved_paper(&self, id: &str) -> Option<&SavedPaperRecord> {
        self.saved_papers.iter().find(|p| p.matches_id(id))
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved_paper(id).is_some()
    }

    /// Drop duplicate saved papers and history entries, keeping the
    /// newest copy, and cap history at `max_history`.
    pub fn enforce_bounds(&mut self, max_history: usize) {
        let mut seen = HashSet::new();
        self.saved_papers.retain(|p| seen.insert(p.id.clone()));
        dedup_history(&mut self.search_history, max_history);
    }
}

/// Partial profile used to create profiles and to shallow-merge updates.
///
/// Every `Some` field replaces the stored value; `extra` keys are merged in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_loose_string"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_papers: Option<Vec<SavedPaperRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_history: Option<Vec<HistoryEntry>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ProfilePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_interests(mut self, interests: Vec<String>) -> Self {
        self.interests = Some(interests);
        self
    }

    /// Identifier, if present and non-blank.
    pub fn target_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Shallow-merge onto `profile`. The profile's id is never changed.
    pub fn apply_to(self, profile: &mut Profile, max_history: usize) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(email) = self.email {
            profile.email = email;
        }
        if let Some(institution) = self.institution {
            profile.institution = institution;
        }
        if let Some(bio) = self.bio {
            profile.bio = bio;
        }
        if let Some(interests) = self.interests {
            profile.interests = interests;
        }
        if let Some(saved_papers) = self.saved_papers {
            profile.saved_papers = saved_papers;
        }
        if let Some(search_history) = self.search_history {
            profile.search_history = search_history;
        }
        profile.extra.extend(self.extra);
        profile.enforce_bounds(max_history);
    }
}
