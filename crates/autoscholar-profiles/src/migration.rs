//! Migration of persisted profile data into the multi-profile document
//!
//! # Stored shapes
//!
//! - Legacy: a bare profile object (`name`, `savedPapers`, `searchHistory`
//!   at the top level, no `profiles` map)
//! - Current: `{ "activeProfileId": ..., "profiles": { id: profile } }`
//!
//! Migration is a pure transformation here; the engine persists the result,
//! after which the stored value no longer looks legacy.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::document::Document;
use crate::lenient::{first_non_empty, scalar_to_string};
use crate::profile::Profile;

/// Shape of a parsed stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredShape {
    /// Already a multi-profile document
    Current,
    /// Single-profile object from before multi-profile support
    Legacy,
    /// Neither; treated like a missing value
    Unrecognized,
}

/// Errors that can occur while decoding or migrating a stored value
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Stored text is not valid JSON
    #[error("Stored data is not valid JSON: {0}")]
    Malformed(String),

    /// JSON does not match any known shape
    #[error("Stored data has an unrecognized shape")]
    Unrecognized,

    /// Known shape, but fields could not be decoded
    #[error("Stored data is corrupted: {0}")]
    CorruptedData(String),
}

/// Classify a parsed stored value.
pub fn detect_shape(value: &Value) -> StoredShape {
    let Value::Object(map) = value else {
        return StoredShape::Unrecognized;
    };
    match map.get("profiles") {
        Some(Value::Object(_)) => return StoredShape::Current,
        Some(Value::Null) | None => {}
        Some(_) => return StoredShape::Unrecognized,
    }

    let has = |key: &str| map.get(key).is_some_and(|v| !v.is_null());
    let has_name = map.get("name").is_some_and(is_truthy_scalar);

    if has("savedPapers") || has("searchHistory") || has_name {
        StoredShape::Legacy
    } else {
        StoredShape::Unrecognized
    }
}

/// Non-empty string, non-zero number or `true`.
fn is_truthy_scalar(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::Bool(b) => *b,
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Outcome of decoding stored text
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Stored value was already current; nothing to persist
    Current(Document),
    /// Stored value was legacy and has been wrapped; must be persisted
    Migrated(Document),
}

impl Decoded {
    pub fn into_document(self) -> Document {
        match self {
            Decoded::Current(doc) | Decoded::Migrated(doc) => doc,
        }
    }
}

/// Decode stored text into a document, migrating legacy data.
///
/// `fresh_id` supplies an identifier when a legacy profile has none, and
/// `max_history` bounds the migrated profile's search history.
pub fn decode(
    raw: &str,
    max_history: usize,
    fresh_id: impl FnOnce() -> String,
) -> Result<Decoded, MigrationError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| MigrationError::Malformed(e.to_string()))?;

    match (detect_shape(&value), value) {
        (StoredShape::Current, Value::Object(map)) => Ok(Decoded::Current(decode_current(map))),
        (StoredShape::Legacy, value) => {
            migrate_legacy(value, max_history, fresh_id).map(Decoded::Migrated)
        }
        _ => Err(MigrationError::Unrecognized),
    }
}

/// Decode a current-shape document one profile at a time.
///
/// A profile that cannot be decoded is dropped with a warning, leaving the
/// others intact. If it was the active one, the first remaining profile
/// becomes active.
fn decode_current(mut map: Map<String, Value>) -> Document {
    let active_profile_id = map.get("activeProfileId").and_then(scalar_to_string);
    let entries = match map.remove("profiles") {
        Some(Value::Object(entries)) => entries,
        _ => Map::new(),
    };

    let mut profiles = BTreeMap::new();
    let mut dropped = Vec::new();
    for (key, entry) in entries {
        match serde_json::from_value::<Profile>(entry) {
            Ok(profile) => {
                profiles.insert(key, profile);
            }
            Err(e) => {
                warn!(profile_id = %key, "Dropping unreadable stored profile: {}", e);
                dropped.push(key);
            }
        }
    }

    let mut doc = Document {
        active_profile_id,
        profiles,
    };
    if doc
        .active_profile_id
        .as_ref()
        .is_some_and(|id| dropped.contains(id))
    {
        doc.active_profile_id = doc.profiles.keys().next().cloned();
    }
    doc.align_profile_ids();
    doc
}

/// Wrap a legacy single-profile value as the sole, active profile.
///
/// The profile keeps its own `id` when it has one. Duplicate saved papers
/// and history entries are dropped and history is capped at `max_history`.
pub fn migrate_legacy(
    mut value: Value,
    max_history: usize,
    fresh_id: impl FnOnce() -> String,
) -> Result<Document, MigrationError> {
    let id = first_non_empty(&value, &["id"]).unwrap_or_else(fresh_id);
    if let Value::Object(map) = &mut value {
        map.insert("id".to_string(), Value::String(id));
    }
    let mut profile: Profile =
        serde_json::from_value(value).map_err(|e| MigrationError::CorruptedData(e.to_string()))?;
    profile.enforce_bounds(max_history);
    Ok(Document::with_single_profile(profile))
}
