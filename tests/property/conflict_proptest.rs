//! Property-based tests for conflict detection and the remote-wins merge

use proptest::prelude::*;
use quote_sync::app::sync::conflict_resolver::detect_conflicts;
use quote_sync::app::sync::merge::merge_remote_wins;
use quote_sync::shared::QuoteRecord;
use std::collections::HashSet;

fn record() -> impl Strategy<Value = QuoteRecord> {
    ("[0-9]{1,2}", "[a-c]{1,3}", "[xy]", "T[1-3]")
        .prop_map(|(id, text, category, ts)| QuoteRecord::with_id(id, text, category, ts))
}

fn collection() -> impl Strategy<Value = Vec<QuoteRecord>> {
    prop::collection::vec(record(), 0..12).prop_map(|records| {
        let mut seen = HashSet::new();
        records.into_iter().filter(|r| seen.insert(r.id.clone())).collect()
    })
}

proptest! {
    #[test]
    fn test_conflicts_need_content_and_time_divergence(local in collection(), remote in collection()) {
        for conflict in detect_conflicts(&local, &remote) {
            prop_assert!(conflict.local.content_differs(&conflict.remote));
            prop_assert_ne!(&conflict.local.updated_at, &conflict.remote.updated_at);
            prop_assert!(local.iter().any(|q| q.id == conflict.id));
        }
    }

    #[test]
    fn test_merge_then_detect_is_quiet(local in collection(), remote in collection()) {
        let mut merged = local.clone();
        merge_remote_wins(&mut merged, &remote);
        prop_assert!(detect_conflicts(&merged, &remote).is_empty());
    }

    #[test]
    fn test_merge_preserves_local_only_and_ids_unique(local in collection(), remote in collection()) {
        let mut merged = local.clone();
        merge_remote_wins(&mut merged, &remote);

        let ids: HashSet<_> = merged.iter().map(|q| q.id.clone()).collect();
        prop_assert_eq!(ids.len(), merged.len());

        for quote in &local {
            if !remote.iter().any(|r| r.id == quote.id) {
                prop_assert!(merged.contains(quote));
            }
        }
        for incoming in &remote {
            let applied = merged.iter().find(|q| q.id == incoming.id).unwrap();
            prop_assert!(!applied.content_differs(incoming));
        }
    }
}
