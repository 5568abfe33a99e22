//! # Conflict Review
//!
//! Per-cycle review state for conflicts surfaced by a sync cycle.
//!
//! ```text
//! Idle --open(conflicts)--> AwaitingReview --all items decided / bulk / dismiss--> Idle
//! ```
//!
//! This module only tracks decisions. The data side of a decision (restoring a
//! local snapshot, pushing to the remote) is carried out by the sync service,
//! using the versions stored on each [`Conflict`].

use crate::app::sync::conflict_resolver::Conflict;
use crate::shared::{QuoteError, Result};

/// Decision recorded for one conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pending,
    KeptRemote,
    KeptLocal,
}

/// A conflict awaiting or carrying a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub conflict: Conflict,
    pub decision: Decision,
}

impl ReviewItem {
    pub fn is_pending(&self) -> bool {
        self.decision == Decision::Pending
    }
}

/// Review surface state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReviewState {
    #[default]
    Idle,
    AwaitingReview { items: Vec<ReviewItem> },
}

/// Conflict review state machine
#[derive(Debug, Default)]
pub struct ConflictReview {
    state: ReviewState,
}

impl ConflictReview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ReviewState::AwaitingReview { .. })
    }

    /// Items of the open review, empty when idle
    pub fn items(&self) -> &[ReviewItem] {
        match &self.state {
            ReviewState::Idle => &[],
            ReviewState::AwaitingReview { items } => items,
        }
    }

    /// Conflicts still waiting for a decision
    pub fn pending(&self) -> Vec<&Conflict> {
        self.items()
            .iter()
            .filter(|item| item.is_pending())
            .map(|item| &item.conflict)
            .collect()
    }

    /// Start reviewing a new cycle's conflicts
    ///
    /// Replaces any unresolved earlier set. An empty set leaves the surface idle.
    pub fn open(&mut self, conflicts: Vec<Conflict>) {
        if conflicts.is_empty() {
            self.state = ReviewState::Idle;
            return;
        }
        let items = conflicts
            .into_iter()
            .map(|conflict| ReviewItem {
                conflict,
                decision: Decision::Pending,
            })
            .collect();
        self.state = ReviewState::AwaitingReview { items };
    }

    /// Record a decision for one conflict and return it
    ///
    /// Fails with `NotFound` when the id is not part of the open review or
    /// was already decided.
    pub fn decide(&mut self, id: &str, decision: Decision) -> Result<Conflict> {
        let ReviewState::AwaitingReview { items } = &mut self.state else {
            return Err(QuoteError::not_found(id));
        };
        let item = items
            .iter_mut()
            .find(|item| item.conflict.id == id && item.is_pending())
            .ok_or_else(|| QuoteError::not_found(id))?;
        item.decision = decision;
        let conflict = item.conflict.clone();

        if items.iter().all(|item| !item.is_pending()) {
            self.state = ReviewState::Idle;
        }
        Ok(conflict)
    }

    /// Close the review, returning the conflicts that were still pending
    pub fn close(&mut self) -> Vec<Conflict> {
        match std::mem::take(&mut self.state) {
            ReviewState::Idle => Vec::new(),
            ReviewState::AwaitingReview { items } => items
                .into_iter()
                .filter(ReviewItem::is_pending)
                .map(|item| item.conflict)
                .collect(),
        }
    }
}
