//! Sync service integration tests: detection, merge, review, concurrency

use crate::common::*;
use pretty_assertions::assert_eq;
use quote_sync::app::remote::MemoryRemote;
use quote_sync::app::sync::conflict_resolver::ConflictKind;
use quote_sync::app::sync::notifier::{NoticeLevel, SyncEvent};
use quote_sync::app::sync::SyncService;
use quote_sync::shared::QuoteRecord;
use std::sync::Arc;

#[tokio::test]
async fn test_timestamp_gates_conflicts() {
    let local = vec![quote("1", "A", "X", "T1"), quote("2", "B", "X", "T1")];
    let remote = vec![quote("1", "A changed", "X", "T1"), quote("2", "B changed", "X", "T2")];
    let (service, _rx) = service_with(&local, MemoryRemote::new(remote));

    let report = service.sync_cycle(false).await.unwrap();
    assert_eq!(report.conflicts, 1);
    let items = service.review_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].conflict.id, "2");
    assert_eq!(items[0].conflict.kind, ConflictKind::Text);
    assert_eq!(items[0].conflict.local.text, "B");
}

#[tokio::test]
async fn test_merge_updates_adds_and_keeps_local_only() {
    let local = vec![quote("1", "A", "X", "T1"), quote("mine", "M", "Z", "T0")];
    let remote = vec![quote("1", "B", "X", "T2"), quote("2", "C", "Y", "T2")];
    let (service, _rx) = service_with(&local, MemoryRemote::new(remote));

    service.sync_cycle(false).await.unwrap();

    let store = service.store().lock().await;
    assert_same_quotes!(
        store.quotes(),
        vec![
            quote("1", "B", "X", ""),
            quote("mine", "M", "Z", ""),
            quote("2", "C", "Y", ""),
        ]
    );
}

#[tokio::test]
async fn test_conflicts_reported_to_notifier_in_order() {
    let local = vec![quote("1", "A", "X", "T1")];
    let remote = vec![quote("1", "A", "Other", "T2")];
    let (service, mut rx) = service_with(&local, MemoryRemote::new(remote));

    service.sync_cycle(true).await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], SyncEvent::Notice(n) if n.message == "Syncing with server..."));
    assert!(matches!(&events[1], SyncEvent::ConflictsDetected(c) if c.len() == 1 && c[0].kind == ConflictKind::Category));
    assert!(matches!(&events[2], SyncEvent::Notice(n) if n.level == NoticeLevel::Warn));
}

#[tokio::test]
async fn test_keep_local_survives_next_cycle_state() {
    let local = vec![quote("1", "Local", "X", "T1")];
    let remote = vec![quote("1", "Server", "X", "T2")];
    let (service, _rx) = service_with(&local, MemoryRemote::new(remote));

    service.sync_cycle(false).await.unwrap();
    service.keep_local("1").await.unwrap();

    assert_eq!(service.store().lock().await.get("1").unwrap().text, "Local");
    assert_eq!(service.remote().pushed().len(), 1);

    // server still serves its version; the next cycle applies it again and
    // flags the divergence because the restore stamped a fresh time
    let report = service.sync_cycle(false).await.unwrap();
    assert_eq!(report.conflicts, 1);
    assert_eq!(service.store().lock().await.get("1").unwrap().text, "Server");
}

#[tokio::test]
async fn test_keep_local_unknown_id_fails() {
    let (service, _rx) = service_with(&[], MemoryRemote::new(vec![]));
    service.sync_cycle(false).await.unwrap();
    assert!(service.keep_local("nope").await.is_err());
    assert!(service.remote().pushed().is_empty());
}

#[tokio::test]
async fn test_manual_sync_waits_for_inflight_cycle() {
    let local = vec![quote("1", "A", "X", "T1")];
    let first = vec![quote("1", "B", "X", "T2")];
    let second = vec![quote("1", "C", "X", "T3"), quote("2", "D", "Y", "T3")];
    let (service, _rx) = service_with(&local, GatedRemote::new(vec![first.clone(), second.clone()]));

    let periodic = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.sync_cycle(false).await })
    };
    service.remote().fetch_started().await;

    let manual = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.sync_cycle(true).await })
    };
    tokio::task::yield_now().await;
    // the manual cycle is queued behind the periodic one and has not fetched
    assert_eq!(service.remote().fetch_count(), 1);

    service.remote().open();
    let periodic = periodic.await.unwrap().unwrap();
    let manual = manual.await.unwrap().unwrap();
    assert_eq!(service.remote().fetch_count(), 2);
    assert_eq!(periodic.conflicts, 1);
    assert_eq!(manual.added, 1);

    // same end state as applying both snapshots one after the other
    let (expected, _rx) = service_with(&local, MemoryRemote::new(first));
    expected.sync_cycle(false).await.unwrap();
    expected.remote().set_records(second);
    expected.sync_cycle(false).await.unwrap();

    assert_same_quotes!(
        service.store().lock().await.quotes(),
        expected.store().lock().await.quotes()
    );
}

#[tokio::test]
async fn test_stale_fetch_is_discarded() {
    let local = vec![quote("1", "A", "X", "T1")];
    let (service, _rx) = service_with(&local, GatedRemote::new(vec![vec![quote("1", "B", "X", "T2")]]));

    let cycle = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.sync_cycle(false).await })
    };
    service.remote().fetch_started().await;

    let replacement = vec![quote("9", "Imported", "Z", "T5")];
    service.store().lock().await.replace_all(replacement.clone());
    service.remote().open();

    let report = cycle.await.unwrap().unwrap();
    assert!(report.discarded);
    assert_same_quotes!(service.store().lock().await.quotes(), replacement);
    assert!(service.review_items().await.is_empty());
    assert_eq!(service.status().await.discarded_results, 1);
}

#[tokio::test]
async fn test_failed_fetch_keeps_store_and_recovers() {
    let local = vec![quote("1", "A", "X", "T1")];
    let remote = MemoryRemote::new(vec![quote("1", "B", "X", "T2")]);
    remote.set_fail_fetch(true);
    let (service, _rx) = service_with(&local, remote);

    assert!(service.sync_cycle(false).await.is_err());
    assert_eq!(service.store().lock().await.get("1").unwrap().text, "A");
    assert_eq!(service.status().await.indicator(), "error");

    service.remote().set_fail_fetch(false);
    service.sync_cycle(false).await.unwrap();
    assert_eq!(service.store().lock().await.get("1").unwrap().text, "B");
    assert!(service.status().await.last_error.is_none());
}

#[tokio::test]
async fn test_sync_against_http_endpoint() {
    let server = mock_posts_server(serde_json::json!([
        post(1, "Server text", "Wisdom and more"),
        post(2, "Brand new", "Humor"),
    ]))
    .await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let local = vec![quote("1", "Local text", "Wisdom", "2020-01-01T00:00:00Z")];
    let (service, _rx) = service_with(&local, remote_for(&server));

    let report = service.sync_cycle(true).await.unwrap();
    assert_eq!((report.fetched, report.added, report.updated, report.conflicts), (2, 1, 1, 1));

    let pushed = service.keep_all_local().await;
    assert_eq!(pushed.succeeded, 2);

    let store = service.store().lock().await;
    assert_eq!(store.get("1").unwrap().text, "Local text");
    assert_eq!(store.get("2").unwrap().category, "Humor");
    drop(store);

    let posts = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(posts, 2);
}

#[tokio::test]
async fn test_quotes_added_during_fetch_survive() {
    let (service, _rx) = service_with(&[], GatedRemote::new(vec![vec![quote("1", "R", "X", "T1")]]));

    let cycle = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.sync_cycle(false).await })
    };
    service.remote().fetch_started().await;
    let added: QuoteRecord = service.store().lock().await.add("Typed meanwhile", "Mine").unwrap();
    service.remote().open();

    let report = cycle.await.unwrap().unwrap();
    assert!(!report.discarded);
    let store = service.store().lock().await;
    assert!(store.get(&added.id).is_some());
    assert!(store.get("1").is_some());
}

#[test]
fn test_service_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SyncService<MemoryRemote>>();
}
