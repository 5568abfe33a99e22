//! # Conflict Detection
//!
//! Compares a local snapshot with a fetched remote snapshot and reports the
//! identifiers whose versions genuinely diverged.
//!
//! An id present on both sides is a conflict only when
//! - text or category differ, **and**
//! - the `updatedAt` values differ.
//!
//! The timestamp test filters out records the remote-wins merge already
//! reconciled in an earlier cycle. Ids present on only one side are additions,
//! never conflicts.
//!
//! Each [`Conflict`] owns copies of both versions, so it can be resolved later
//! even after the merge has overwritten the local record.

use crate::shared::QuoteRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A per-identifier divergence between local and remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    /// Local version as it was before the merge
    pub local: QuoteRecord,
    /// Remote version that the merge applied
    pub remote: QuoteRecord,
    pub kind: ConflictKind,
}

/// Which fields diverged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    Text,
    Category,
    TextAndCategory,
}

impl ConflictKind {
    fn between(local: &QuoteRecord, remote: &QuoteRecord) -> Option<Self> {
        match (local.text != remote.text, local.category != remote.category) {
            (true, true) => Some(Self::TextAndCategory),
            (true, false) => Some(Self::Text),
            (false, true) => Some(Self::Category),
            (false, false) => None,
        }
    }
}

/// Detect conflicts between a local and a remote collection
///
/// Results follow the order in which ids first appear remotely. A remote id
/// listed twice is judged by its last occurrence.
pub fn detect_conflicts(local: &[QuoteRecord], remote: &[QuoteRecord]) -> Vec<Conflict> {
    let local_map: HashMap<&str, &QuoteRecord> =
        local.iter().map(|q| (q.id.as_str(), q)).collect();

    let mut order: Vec<&str> = Vec::new();
    let mut remote_map: HashMap<&str, &QuoteRecord> = HashMap::new();
    for item in remote {
        if remote_map.insert(item.id.as_str(), item).is_none() {
            order.push(item.id.as_str());
        }
    }

    let conflicts: Vec<Conflict> = order
        .into_iter()
        .filter_map(|id| {
            let remote_item = remote_map[id];
            let local_item = local_map.get(id)?;
            let kind = ConflictKind::between(local_item, remote_item)?;
            if local_item.updated_at == remote_item.updated_at {
                return None;
            }
            Some(Conflict {
                id: id.to_string(),
                local: (*local_item).clone(),
                remote: remote_item.clone(),
                kind,
            })
        })
        .collect();

    if !conflicts.is_empty() {
        tracing::debug!("Detected {} conflicting quotes", conflicts.len());
    }
    conflicts
}
