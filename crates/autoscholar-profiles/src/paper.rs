//! Saved paper records
//!
//! Papers arrive from search results and citation graphs in whatever shape
//! the upstream API produced. [`SavedPaperRecord::from_external`] projects
//! them onto a small, stable record before anything is persisted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient::{first_non_empty, loose_string, opt_loose_string, scalar_to_string};

/// Fields consulted, in order, to identify an external paper.
pub const IDENTITY_FIELDS: [&str; 4] = ["id", "paper_id", "doi", "title"];

/// Storage-safe projection of an external paper.
///
/// `id` is derived once at capture time and never recomputed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPaperRecord {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "stored_authors")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub year: Option<String>,
    #[serde(default, alias = "pdfUrl", deserialize_with = "opt_loose_string")]
    pub pdf_url: Option<String>,
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub url: Option<String>,
}

impl SavedPaperRecord {
    /// Create a record with just an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            authors: Vec::new(),
            year: None,
            pdf_url: None,
            url: None,
        }
    }

    /// Builder method to add a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Project an external paper object, keeping at most `max_authors` names.
    ///
    /// Returns `None` when no identity can be derived.
    pub fn from_external(paper: &Value, max_authors: usize) -> Option<Self> {
        let id = derive_id(paper)?;
        let mut authors = project_authors(paper.get("authors"));
        authors.truncate(max_authors);

        Some(Self {
            id,
            title: paper.get("title").and_then(scalar_to_string),
            authors,
            year: project_year(paper),
            pdf_url: first_non_empty(paper, &["pdf_url", "pdf"]),
            url: first_non_empty(paper, &["url", "pdf_url", "pdf"]),
        })
    }

    /// Identity comparison against a caller-supplied identifier.
    pub fn matches_id(&self, id: &str) -> bool {
        !self.id.is_empty() && self.id == id
    }
}

/// Identity of an external paper: first non-empty of `id`, `paper_id`,
/// `doi`, `title`. Numeric identifiers compare by their decimal form.
pub fn derive_id(paper: &Value) -> Option<String> {
    first_non_empty(paper, &IDENTITY_FIELDS)
}

/// Display names from a loosely shaped author field.
///
/// Accepts a list of strings, a list of `{name}` or
/// `{given_name, family_name}` objects, or a single BibTeX-style string.
pub fn project_authors(authors: Option<&Value>) -> Vec<String> {
    match authors {
        Some(Value::Array(items)) => items.iter().filter_map(author_display_name).collect(),
        Some(Value::String(field)) => split_authors(field),
        _ => Vec::new(),
    }
}

/// Split a BibTeX author field on " and " and ";" separators.
pub fn split_authors(author_field: &str) -> Vec<String> {
    author_field
        .split(" and ")
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn author_display_name(author: &Value) -> Option<String> {
    match author {
        Value::String(name) => non_blank(name),
        Value::Object(_) => {
            if let Some(name) = author.get("name").and_then(Value::as_str).and_then(non_blank) {
                return Some(name);
            }
            let family = first_non_empty(author, &["family_name", "family"])?;
            match first_non_empty(author, &["given_name", "given"]) {
                Some(given) => Some(format!("{} {}", given.trim(), family.trim())),
                None => Some(family.trim().to_string()),
            }
        }
        _ => None,
    }
}

fn project_year(paper: &Value) -> Option<String> {
    let from_date = paper
        .get("publication_date")
        .and_then(Value::as_str)
        .and_then(|date| date.split('-').next())
        .and_then(non_blank);
    from_date.or_else(|| first_non_empty(paper, &["year"]))
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn stored_authors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(project_authors(Some(&value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derive_id_follows_fallback_chain() {
        assert_eq!(derive_id(&json!({"id": "p1", "doi": "10.1/x"})), Some("p1".into()));
        assert_eq!(derive_id(&json!({"paper_id": 77})), Some("77".into()));
        assert_eq!(derive_id(&json!({"doi": "10.1/x", "title": "T"})), Some("10.1/x".into()));
        assert_eq!(derive_id(&json!({"id": "", "title": "Only Title"})), Some("Only Title".into()));
        assert_eq!(derive_id(&json!({"authors": ["A"]})), None);
        assert_eq!(derive_id(&json!("not an object")), None);
    }

    #[test]
    fn projection_normalizes_mixed_shapes() {
        let paper = json!({
            "id": 12,
            "title": "Attention Is All You Need",
            "authors": [
                "Ashish Vaswani",
                {"name": "Noam Shazeer"},
                {"given_name": "Niki", "family_name": "Parmar"},
                5
            ],
            "publication_date": "2017-06-12",
            "pdf": "https://arxiv.org/pdf/1706.03762"
        });
        let record = SavedPaperRecord::from_external(&paper, 10).unwrap();
        assert_eq!(record.id, "12");
        assert_eq!(record.authors, vec!["Ashish Vaswani", "Noam Shazeer", "Niki Parmar"]);
        assert_eq!(record.year.as_deref(), Some("2017"));
        assert_eq!(record.pdf_url.as_deref(), Some("https://arxiv.org/pdf/1706.03762"));
        assert_eq!(record.url.as_deref(), Some("https://arxiv.org/pdf/1706.03762"));
    }

    #[test]
    fn projection_caps_authors() {
        let authors: Vec<String> = (0..25).map(|i| format!("Author {}", i)).collect();
        let record =
            SavedPaperRecord::from_external(&json!({"id": "p", "authors": authors}), 10).unwrap();
        assert_eq!(record.authors.len(), 10);
        assert_eq!(record.authors[9], "Author 9");
    }

    #[test]
    fn bibtex_author_string_is_split() {
        let paper = json!({"id": "p", "authors": "Einstein, A. and Bohr, N.; Curie, M."});
        let record = SavedPaperRecord::from_external(&paper, 10).unwrap();
        assert_eq!(record.authors, vec!["Einstein, A.", "Bohr, N.", "Curie, M."]);
    }

    #[test]
    fn bare_year_used_without_publication_date() {
        let record =
            SavedPaperRecord::from_external(&json!({"id": "p", "year": 1905}), 10).unwrap();
        assert_eq!(record.year.as_deref(), Some("1905"));

        let record = SavedPaperRecord::from_external(&json!({"id": "p"}), 10).unwrap();
        assert_eq!(record.year, None);
    }

    #[test]
    fn url_prefers_landing_page() {
        let paper = json!({"id": "p", "url": "https://doi.org/x", "pdf_url": "https://x.pdf"});
        let record = SavedPaperRecord::from_external(&paper, 10).unwrap();
        assert_eq!(record.url.as_deref(), Some("https://doi.org/x"));
        assert_eq!(record.pdf_url.as_deref(), Some("https://x.pdf"));
    }

    #[test]
    fn stored_record_tolerates_legacy_fields() {
        let record: SavedPaperRecord = serde_json::from_value(json!({
            "id": 3,
            "title": null,
            "authors": [{"name": "Grace Hopper"}],
            "year": 1952,
            "pdfUrl": "https://a.pdf"
        }))
        .unwrap();
        assert_eq!(record.id, "3");
        assert_eq!(record.authors, vec!["Grace Hopper"]);
        assert_eq!(record.year.as_deref(), Some("1952"));
        assert_eq!(record.pdf_url.as_deref(), Some("https://a.pdf"));
        assert_eq!(record.url, None);
    }

    #[test]
    fn serialized_field_names_match_stored_layout() {
        let json = serde_json::to_value(SavedPaperRecord::new("p1").with_title("T")).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["title"], "T");
        assert!(json.get("pdf_url").is_some());
        assert!(json["url"].is_null());
    }

    #[test]
    fn empty_id_never_matches() {
        let record = SavedPaperRecord::new("");
        assert!(!record.matches_id(""));
        assert!(SavedPaperRecord::new("p1").matches_id("p1"));
    }
}
