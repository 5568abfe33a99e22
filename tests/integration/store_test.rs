//! Local store integration tests over file-backed storage

use crate::common::*;
use pretty_assertions::assert_eq;
use quote_sync::app::local_store::{CategoryFilter, LocalStore};
use quote_sync::app::storage::{KeyValueStore, MemoryStorage, LAST_VIEWED_KEY, QUOTES_KEY};
use quote_sync::shared::QuoteError;
use std::sync::Arc;

#[test]
fn test_add_persists_across_reopen() {
    let (_dir, storage) = temp_file_storage();
    let mut store = LocalStore::open(storage.clone(), Arc::new(MemoryStorage::new()));
    let before = store.len();

    let added = crate::assert_ok!(store.add("  Less is more.  ", "Design"));
    assert_eq!(store.len(), before + 1);
    assert_eq!(store.get(&added.id).unwrap().text, "Less is more.");

    let reopened = LocalStore::open(storage, Arc::new(MemoryStorage::new()));
    assert_eq!(reopened.len(), before + 1);
    assert_eq!(reopened.get(&added.id).unwrap().category, "Design");
}

#[test]
fn test_first_open_seeds_defaults() {
    let (_dir, storage) = temp_file_storage();
    let store = LocalStore::open(storage.clone(), Arc::new(MemoryStorage::new()));
    assert_eq!(store.len(), 3);
    assert!(storage.get(QUOTES_KEY).unwrap().is_some());
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let (_dir, storage) = temp_file_storage();
    storage.set(QUOTES_KEY, "{ not json").unwrap();
    let store = LocalStore::open(storage, Arc::new(MemoryStorage::new()));
    assert_eq!(store.len(), 3);
}

#[test]
fn test_legacy_shapes_load() {
    let (_dir, storage) = temp_file_storage();
    storage
        .set(
            QUOTES_KEY,
            r#"[
                {"id": 7, "title": "Old text", "body": "Old"},
                {"id": "8", "text": "", "category": "Dropped"},
                {"id": "9", "text": "Kept", "category": "New", "updatedAt": "T1"}
            ]"#,
        )
        .unwrap();
    let store = LocalStore::open(storage, Arc::new(MemoryStorage::new()));
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("7").unwrap().text, "Old text");
    assert_eq!(store.get("9").unwrap().updated_at, "T1");
}

#[test]
fn test_invalid_add_changes_nothing() {
    let (mut store, durable, _) = memory_store(&[quote("1", "A", "X", "T1")]);
    let stored = durable.get(QUOTES_KEY).unwrap();

    assert!(matches!(store.add("   ", "X"), Err(QuoteError::Validation { .. })));
    assert!(matches!(store.add("text", ""), Err(QuoteError::Validation { .. })));
    assert_eq!(store.len(), 1);
    assert_eq!(durable.get(QUOTES_KEY).unwrap(), stored);
}

#[test]
fn test_remove_exactly_one_and_clear_last_viewed() {
    let (mut store, _, session) = memory_store(&[
        quote("1", "A", "X", "T1"),
        quote("2", "B", "X", "T1"),
        quote("3", "C", "Y", "T1"),
    ]);
    store.show("2").unwrap();
    assert_eq!(session.get(LAST_VIEWED_KEY).unwrap().as_deref(), Some("2"));

    store.remove("2").unwrap();
    assert_same_quotes!(store.quotes(), vec![quote("1", "A", "X", ""), quote("3", "C", "Y", "")]);
    assert_eq!(session.get(LAST_VIEWED_KEY).unwrap(), None);

    store.show("1").unwrap();
    store.remove("3").unwrap();
    assert_eq!(session.get(LAST_VIEWED_KEY).unwrap().as_deref(), Some("1"));

    assert!(matches!(store.remove("missing"), Err(QuoteError::NotFound { .. })));
}

#[test]
fn test_export_import_roundtrip_keeps_content() {
    let (mut store, _, _) = memory_store(&[quote("1", "A", "X", "T1"), quote("2", "B", "Y", "T1")]);
    let exported = store.export_json().unwrap();

    let (mut other, _, _) = memory_store(&[]);
    assert_eq!(other.import_json(&exported).unwrap(), 2);
    assert_same_quotes!(other.quotes(), store.quotes());

    // importing into the source collides on every id
    store.import_json(&exported).unwrap();
    assert_eq!(store.len(), 4);
    assert_eq!(store.quotes()[0].text, "A");
    assert_ne!(store.quotes()[2].id, "1");
    assert_eq!(store.quotes()[2].text, "A");
}

#[test]
fn test_import_rejects_without_partial_write() {
    let (mut store, durable, _) = memory_store(&[quote("1", "A", "X", "T1")]);
    let stored = durable.get(QUOTES_KEY).unwrap();

    assert!(matches!(store.import_json("{]"), Err(QuoteError::Parse { .. })));
    assert!(matches!(store.import_json(r#"{"text": "A"}"#), Err(QuoteError::Parse { .. })));
    assert!(matches!(
        store.import_json(r#"[{"text": ""}, {"category": "X"}]"#),
        Err(QuoteError::Validation { .. })
    ));
    assert_eq!(store.len(), 1);
    assert_eq!(durable.get(QUOTES_KEY).unwrap(), stored);
}

#[test]
fn test_import_accepts_alternate_field_names() {
    let (mut store, _, _) = memory_store(&[]);
    let count = store
        .import_json(r#"[{"quote": "Alt text", "cat": "Alt"}, {"text": "Plain", "category": "P"}]"#)
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(store.quotes()[0].category, "Alt");
}

#[test]
fn test_random_respects_filter() {
    let (store, _, _) = memory_store(&[
        quote("1", "A", "X", "T1"),
        quote("2", "B", "Y", "T1"),
        quote("3", "C", "X", "T1"),
    ]);
    let filter = CategoryFilter::Category("X".to_string());
    for _ in 0..50 {
        assert_eq!(store.random_quote(&filter).unwrap().category, "X");
    }
}

#[test]
fn test_random_empty_pool_changes_nothing() {
    let (store, _, session) = memory_store(&[quote("1", "A", "X", "T1")]);
    store.show("1").unwrap();

    assert!(store.random_quote(&CategoryFilter::Category("Nope".into())).is_none());
    assert_eq!(session.get(LAST_VIEWED_KEY).unwrap().as_deref(), Some("1"));
}

#[test]
fn test_filter_persists_and_falls_back() {
    let (_dir, storage) = temp_file_storage();
    let mut store = LocalStore::open(storage.clone(), Arc::new(MemoryStorage::new()));
    store.add("A", "Solo").unwrap();
    store.set_filter(&CategoryFilter::Category("Solo".into())).unwrap();

    let mut reopened = LocalStore::open(storage, Arc::new(MemoryStorage::new()));
    assert_eq!(reopened.selected_filter(), CategoryFilter::Category("Solo".into()));

    let id = reopened.filtered(&CategoryFilter::Category("Solo".into()))[0].id.clone();
    reopened.remove(&id).unwrap();
    assert_eq!(reopened.selected_filter(), CategoryFilter::All);
}

#[test]
fn test_write_failure_keeps_memory_ahead() {
    let durable = Arc::new(MemoryStorage::with_quota(40));
    durable.set(QUOTES_KEY, "[]").unwrap();
    let mut store = LocalStore::open(durable.clone(), Arc::new(MemoryStorage::new()));

    let added = store.add("A quote long enough to exceed the quota", "Big").unwrap();
    assert!(store.get(&added.id).is_some());
    assert!(store.is_dirty());
    assert!(matches!(store.last_storage_error(), Some(QuoteError::Storage { .. })));
    assert_eq!(durable.get(QUOTES_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_failed_write_is_reported_and_not_on_disk() {
    let (_dir, storage) = temp_file_storage();
    let mut store = LocalStore::open(storage.clone(), Arc::new(MemoryStorage::new()));
    assert!(store.check_persisted().is_ok());

    std::fs::create_dir(storage.dir().join("quotesList.json.tmp")).unwrap();
    let added = store.add("Unsaved quote", "Lost").unwrap();
    assert!(matches!(store.check_persisted(), Err(QuoteError::Storage { .. })));

    let reopened = LocalStore::open(storage.clone(), Arc::new(MemoryStorage::new()));
    assert!(reopened.get(&added.id).is_none());

    // the next successful write catches the slot up
    std::fs::remove_dir(storage.dir().join("quotesList.json.tmp")).unwrap();
    store.remove(&reopened.quotes()[0].id).unwrap();
    assert!(store.check_persisted().is_ok());
    let reopened = LocalStore::open(storage, Arc::new(MemoryStorage::new()));
    assert!(reopened.get(&added.id).is_some());
}

#[test]
fn test_quota_failure_is_reported_by_check() {
    let durable = Arc::new(MemoryStorage::with_quota(40));
    durable.set(QUOTES_KEY, "[]").unwrap();
    let mut store = LocalStore::open(durable, Arc::new(MemoryStorage::new()));

    store.import_json(r#"[{"text": "An import too large for the quota", "category": "Big"}]"#).unwrap();
    let err = store.check_persisted().unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
}
