//! # Remote-Wins Merge
//!
//! Pull-with-remote-priority reconciliation of a fetched remote collection
//! into the local one.
//!
//! - remote id unknown locally: appended
//! - remote id known locally with different text/category: local text,
//!   category and timestamp are overwritten, whether or not the detector
//!   flagged the id
//! - local-only ids: untouched
//!
//! There is no field-level merge. Persisting the result is the caller's job.

use crate::shared::{now_timestamp, QuoteRecord};
use std::collections::HashMap;

/// What a merge changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Remote records appended locally
    pub added: usize,
    /// Local records overwritten with remote content
    pub updated: usize,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.updated > 0
    }
}

/// Apply `remote` onto `local` in place
pub fn merge_remote_wins(local: &mut Vec<QuoteRecord>, remote: &[QuoteRecord]) -> MergeOutcome {
    let mut index: HashMap<String, usize> = local
        .iter()
        .enumerate()
        .map(|(i, q)| (q.id.clone(), i))
        .collect();
    let mut outcome = MergeOutcome::default();

    for incoming in remote {
        let updated_at = if incoming.updated_at.is_empty() {
            now_timestamp()
        } else {
            incoming.updated_at.clone()
        };

        match index.get(&incoming.id) {
            None => {
                index.insert(incoming.id.clone(), local.len());
                local.push(QuoteRecord {
                    id: incoming.id.clone(),
                    text: incoming.text.clone(),
                    category: incoming.category.clone(),
                    updated_at,
                    locally_added: false,
                });
                outcome.added += 1;
            }
            Some(&i) => {
                let existing = &mut local[i];
                existing.locally_added = false;
                if existing.content_differs(incoming) {
                    existing.text = incoming.text.clone();
                    existing.category = incoming.category.clone();
                    existing.updated_at = updated_at;
                    outcome.updated += 1;
                }
            }
        }
    }

    if outcome.changed() {
        tracing::debug!(
            "Remote merge added {} and updated {} quotes",
            outcome.added,
            outcome.updated
        );
    }
    outcome
}
