//! Search history entries

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient::loose_string;

/// One remembered search, newest first in a profile's history.
///
/// `id` and `date` hold the same RFC 3339 timestamp at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub query: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub date: String,
}

impl HistoryEntry {
    /// Entry for an already-normalized query recorded at `at`.
    pub fn new(query: impl Into<String>, at: DateTime<Utc>) -> Self {
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            id: timestamp.clone(),
            query: query.into(),
            date: timestamp,
        }
    }
}

/// Trimmed query text, or `None` if nothing is left.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Put `entry` at the front, dropping any older entry with the same query
/// and keeping at most `max` entries.
pub fn record_query(history: &mut Vec<HistoryEntry>, entry: HistoryEntry, max: usize) {
    history.retain(|h| h.query.trim() != entry.query);
    history.insert(0, entry);
    history.truncate(max);
}

/// Drop later duplicates (by trimmed query) and cap the length.
pub fn dedup_history(history: &mut Vec<HistoryEntry>, max: usize) {
    let mut seen = std::collections::HashSet::new();
    history.retain(|h| seen.insert(h.query.trim().to_string()));
    history.truncate(max);
}
