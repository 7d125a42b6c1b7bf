//! Tolerant field decoding for persisted data.
//!
//! Older writers stored identifiers as numbers and left fields `null`;
//! these helpers read such values instead of rejecting the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// String form of a scalar JSON value (`"7"` for `7`, `"true"` for `true`).
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// First field of `object` holding a non-blank scalar, in the given order.
pub fn first_non_empty(object: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .filter_map(scalar_to_string)
        .find(|s| !s.trim().is_empty())
}

/// Scalar as string; `null` and structured values become empty.
pub fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

/// Scalar as optional string; `null` becomes `None`.
pub fn opt_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

/// List of strings; non-string items are skipped, a bare string is a
/// one-item list, and anything else is empty.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    };
    Ok(list)
}

/// `null` decodes as the type's default.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_become_decimal_strings() {
        assert_eq!(scalar_to_string(&json!(42)), Some("42".into()));
        assert_eq!(scalar_to_string(&json!("42")), Some("42".into()));
        assert_eq!(scalar_to_string(&json!(null)), None);
        assert_eq!(scalar_to_string(&json!(["a"])), None);
    }

    #[derive(Deserialize)]
    struct Tags {
        #[serde(default, deserialize_with = "string_list")]
        tags: Vec<String>,
    }

    fn tags(value: Value) -> Vec<String> {
        serde_json::from_value::<Tags>(value).unwrap().tags
    }

    #[test]
    fn string_list_skips_non_strings() {
        assert_eq!(tags(json!({"tags": ["optics", 7, null, "lasers"]})), vec!["optics", "lasers"]);
        assert_eq!(tags(json!({"tags": "optics"})), vec!["optics"]);
        assert!(tags(json!({"tags": null})).is_empty());
        assert!(tags(json!({"tags": {"a": 1}})).is_empty());
        assert!(tags(json!({})).is_empty());
    }

    #[test]
    fn first_non_empty_skips_blank_and_null() {
        let paper = json!({"id": null, "paper_id": "  ", "doi": "10.1/x", "title": "T"});
        assert_eq!(
            first_non_empty(&paper, &["id", "paper_id", "doi", "title"]),
            Some("10.1/x".into())
        );
        assert_eq!(first_non_empty(&paper, &["missing"]), None);
    }
}
