//! Property-based checks of the store invariants

use std::collections::HashSet;

use autoscholar_profiles::{ProfilePatch, ProfileStore, ProfileStoreConfig, DEFAULT_STORAGE_KEY};
use autoscholar_store::MemoryStore;
use proptest::prelude::*;
use serde_json::{json, Value};

fn small_store(max_history: usize) -> ProfileStore<MemoryStore> {
    let config = ProfileStoreConfig {
        max_history,
        ..ProfileStoreConfig::default()
    };
    ProfileStore::with_config(MemoryStore::new(), config)
}

/// Single-profile objects as written before multi-profile support, in the
/// field layout the store writes back.
fn legacy_profile() -> impl Strategy<Value = Value> {
    (
        proptest::option::of("[1-9][0-9]{0,12}"),
        "[A-Za-z][A-Za-z ]{0,15}",
        "[a-z]{0,8}(@[a-z]{1,6}\\.org)?",
        proptest::collection::vec("[a-z]{1,8}", 0..4),
        proptest::collection::btree_set("[a-z0-9]{1,8}", 0..6),
        proptest::collection::btree_set("[a-z]{1,6}( [a-z]{1,6})?", 0..8),
    )
        .prop_map(|(id, name, email, interests, paper_ids, queries)| {
            let saved_papers: Vec<Value> = paper_ids
                .iter()
                .map(|id| {
                    json!({
                        "id": id,
                        "title": format!("On {}", id),
                        "authors": ["A. Author"],
                        "year": null,
                        "pdf_url": null,
                        "url": null
                    })
                })
                .collect();
            let search_history: Vec<Value> = queries
                .iter()
                .map(|q| {
                    let date = "2024-03-01T12:00:00.000Z";
                    json!({"id": date, "query": q, "date": date})
                })
                .collect();

            let mut legacy = json!({
                "name": name,
                "email": email,
                "institution": "",
                "bio": "",
                "interests": interests,
                "savedPapers": saved_papers,
                "searchHistory": search_history
            });
            if let Some(id) = id {
                legacy["id"] = json!(id);
            }
            legacy
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn toggle_alternates_and_never_duplicates(toggles in 1usize..8, id in "[a-z0-9]{1,12}") {
        let store = small_store(200);
        let paper = json!({"id": id.clone(), "title": "T"});

        for n in 1..=toggles {
            let now_saved = store.toggle_saved_paper(&paper).unwrap();
            prop_assert_eq!(now_saved, n % 2 == 1);

            let copies = store
                .saved_papers()
                .unwrap()
                .iter()
                .filter(|p| p.id == id)
                .count();
            prop_assert_eq!(copies, usize::from(now_saved));
            prop_assert_eq!(store.is_paper_saved(&id).unwrap(), now_saved);
        }
    }

    #[test]
    fn history_is_bounded_and_unique(
        queries in proptest::collection::vec("[ ]{0,2}[a-d]{1,2}[ ]{0,2}", 0..40),
        max in 1usize..10,
    ) {
        let store = small_store(max);
        for q in &queries {
            store.add_search_history(q).unwrap();
        }

        let history = store.search_history().unwrap();
        prop_assert!(history.len() <= max);

        let unique: HashSet<_> = history.iter().map(|h| h.query.clone()).collect();
        prop_assert_eq!(unique.len(), history.len());

        // Most recent query is first
        if let Some(last) = queries.last() {
            prop_assert_eq!(history[0].query.as_str(), last.trim());
        }
    }

    #[test]
    fn deleting_active_keeps_pointer_valid(extra in 0usize..5, delete_rounds in 1usize..7) {
        let store = small_store(200);
        for i in 0..extra {
            store.create_profile(ProfilePatch::new().with_id(format!("p{}", i))).unwrap();
        }

        for _ in 0..delete_rounds {
            let doc = store.read();
            let Some(active) = doc.active_profile_id.clone() else {
                prop_assert!(doc.profiles.is_empty());
                break;
            };
            prop_assert!(store.delete_profile(&active).unwrap());

            let doc = store.read();
            match &doc.active_profile_id {
                Some(id) => prop_assert!(doc.profiles.contains_key(id)),
                None => prop_assert!(doc.profiles.is_empty()),
            }
        }
    }

    #[test]
    fn legacy_migration_is_applied_once(legacy in legacy_profile()) {
        let backend = MemoryStore::new();
        backend.insert_raw(DEFAULT_STORAGE_KEY, &legacy.to_string());
        let store = ProfileStore::new(backend);
        let rx = store.subscribe();

        let doc = store.read();
        prop_assert_eq!(doc.profiles.len(), 1);
        let active = doc.active_profile().unwrap();
        if let Some(id) = legacy.get("id") {
            prop_assert_eq!(&json!(active.id), id);
        }

        let mut expected = legacy.clone();
        expected["id"] = json!(active.id);
        prop_assert_eq!(serde_json::to_value(active).unwrap(), expected);
        prop_assert_eq!(rx.try_iter().count(), 1);

        let migrated = store.backend_snapshot();
        prop_assert_eq!(store.read(), doc);
        prop_assert_eq!(store.backend_snapshot(), migrated);
        prop_assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn unknown_profile_switch_changes_nothing(unknown in "[a-z]{3,10}") {
        let store = small_store(200);
        store.read();
        let before = store.backend_snapshot();
        let rx = store.subscribe();

        let missing = format!("missing-{}", unknown);
        prop_assert!(!store.set_active_profile(&missing).unwrap());
        prop_assert_eq!(store.backend_snapshot(), before);
        prop_assert!(rx.try_recv().is_err());
    }
}

trait Snapshot {
    fn backend_snapshot(&self) -> Option<String>;
}

impl Snapshot for ProfileStore<MemoryStore> {
    fn backend_snapshot(&self) -> Option<String> {
        use autoscholar_store::KeyValueStore;
        self.backend().get(&self.config().storage_key).unwrap()
    }
}
