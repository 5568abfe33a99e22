//! # Sync Service
//!
//! Reconciles the local store with the remote endpoint.
//!
//! ## Cycle
//!
//! 1. fetch the remote collection (no store lock held while waiting)
//! 2. discard the result if the store was wholesale replaced meanwhile
//! 3. detect conflicts against the current store
//! 4. apply remote-wins and persist the whole collection
//! 5. open the conflict review when conflicts exist
//!
//! At most one cycle runs at a time: a cycle requested while another is in
//! flight waits for it and then runs on its own fetch, so two snapshots are
//! always applied one after the other.
//!
//! ## Components
//!
//! - **Conflict Resolver**: conflict detection
//! - **Merge**: remote-wins policy
//! - **Review**: manual keep-remote / keep-local decisions
//! - **Scheduler**: startup cycle, fixed interval, manual trigger
//! - **Notifier**: status notices
//! - **Sync State**: status indicator data
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quote_sync::app::local_store::LocalStore;
//! use quote_sync::app::remote::HttpRemote;
//! use quote_sync::app::storage::MemoryStorage;
//! use quote_sync::app::sync::{SyncService, notifier::TracingNotifier};
//! use quote_sync::shared::AppConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> quote_sync::shared::Result<()> {
//! let config = AppConfig::default();
//! let store = LocalStore::open(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()));
//! let service = SyncService::new(store, HttpRemote::new(&config)?, Arc::new(TracingNotifier));
//!
//! let report = service.sync_cycle(true).await?;
//! println!("{} conflicts", report.conflicts);
//! # Ok(())
//! # }
//! ```

pub mod conflict_resolver;
pub mod merge;
pub mod notifier;
pub mod review;
pub mod scheduler;
pub mod sync_state;

use crate::app::local_store::LocalStore;
use crate::app::remote::{PushReport, RemoteSource};
use crate::shared::{QuoteRecord, Result};
use conflict_resolver::{detect_conflicts, Conflict};
use notifier::{Notice, Notifier};
use review::{ConflictReview, Decision, ReviewItem};
use std::sync::Arc;
use sync_state::SyncState;
use tokio::sync::{Mutex, RwLock};

pub use scheduler::SyncScheduler;

/// Outcome of one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Remote records received
    pub fetched: usize,
    /// Remote records appended locally
    pub added: usize,
    /// Local records overwritten by remote content
    pub updated: usize,
    /// Conflicts opened for review
    pub conflicts: usize,
    /// The fetch result was stale and ignored
    pub discarded: bool,
}

/// Main sync coordinator
pub struct SyncService<R: RemoteSource> {
    store: Arc<Mutex<LocalStore>>,
    remote: Arc<R>,
    notifier: Arc<dyn Notifier>,
    review: Mutex<ConflictReview>,
    state: RwLock<SyncState>,
    /// Held for the whole of a cycle; serializes cycles and review writes
    cycle_lock: Mutex<()>,
}

impl<R: RemoteSource> std::fmt::Debug for SyncService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService").finish_non_exhaustive()
    }
}

impl<R: RemoteSource> SyncService<R> {
    pub fn new(store: LocalStore, remote: R, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_shared(Arc::new(Mutex::new(store)), Arc::new(remote), notifier)
    }

    /// Build from a store and remote that other components also hold
    pub fn with_shared(
        store: Arc<Mutex<LocalStore>>,
        remote: Arc<R>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            remote,
            notifier,
            review: Mutex::new(ConflictReview::new()),
            state: RwLock::new(SyncState::default()),
            cycle_lock: Mutex::new(()),
        }
    }

    /// The store this service reconciles
    pub fn store(&self) -> &Arc<Mutex<LocalStore>> {
        &self.store
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// Get current sync status
    pub async fn status(&self) -> SyncState {
        self.state.read().await.clone()
    }

    /// Items of the open review
    pub async fn review_items(&self) -> Vec<ReviewItem> {
        self.review.lock().await.items().to_vec()
    }

    /// Run one full reconciliation cycle
    ///
    /// With `notify` false only failures are reported, which is how the
    /// startup and periodic cycles run.
    pub async fn sync_cycle(&self, notify: bool) -> Result<SyncReport> {
        let _cycle = self.cycle_lock.lock().await;
        self.state.write().await.is_syncing = true;
        if notify {
            self.notifier.notify(Notice::info("Syncing with server..."));
        }

        let generation = self.store.lock().await.generation();
        let fetched = match self.remote.fetch_remote().await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::error!("Sync failed: {}", e);
                self.notifier.notify(Notice::warn(format!("Sync failed: {}", e)));
                let mut state = self.state.write().await;
                state.is_syncing = false;
                state.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let mut store = self.store.lock().await;
        if store.generation() != generation {
            drop(store);
            tracing::warn!("Discarding stale sync result; the store was replaced during the fetch");
            if notify {
                self.notifier
                    .notify(Notice::warn("Quotes changed during sync; server data was not applied."));
            }
            let mut state = self.state.write().await;
            state.is_syncing = false;
            state.cycles_completed += 1;
            state.discarded_results += 1;
            return Ok(SyncReport {
                fetched: fetched.len(),
                discarded: true,
                ..SyncReport::default()
            });
        }

        let conflicts = detect_conflicts(store.quotes(), &fetched);
        let outcome = store.apply_remote(&fetched);
        let saved = store.persist();
        drop(store);

        if let Err(e) = saved {
            tracing::warn!("Synced quotes kept in memory only: {}", e);
            self.notifier
                .notify(Notice::warn(format!("Could not save synced quotes: {}", e)));
        }

        let report = SyncReport {
            fetched: fetched.len(),
            added: outcome.added,
            updated: outcome.updated,
            conflicts: conflicts.len(),
            discarded: false,
        };

        if conflicts.is_empty() {
            if notify {
                self.notifier.notify(Notice::info("Synced successfully."));
            }
        } else {
            self.notifier.conflicts_detected(&conflicts);
            self.review.lock().await.open(conflicts);
            if notify {
                self.notifier.notify(Notice::warn(
                    "Conflicts detected and server changes applied. You can review them.",
                ));
            }
        }

        let pending = self.review.lock().await.pending().len();
        let mut state = self.state.write().await;
        state.is_syncing = false;
        state.last_sync = Some(chrono::Utc::now().to_rfc3339());
        state.last_error = None;
        state.cycles_completed += 1;
        state.pending_conflicts = pending;
        drop(state);

        tracing::info!(
            "Sync complete: {} fetched, {} added, {} updated, {} conflicts",
            report.fetched,
            report.added,
            report.updated,
            report.conflicts
        );
        Ok(report)
    }

    /// Keep the server version of one conflict
    ///
    /// The merge already applied it, so no data changes.
    pub async fn keep_remote(&self, id: &str) -> Result<()> {
        self.review.lock().await.decide(id, Decision::KeptRemote)?;
        self.refresh_pending().await;
        self.notifier
            .notify(Notice::info(format!("Kept server version for item {}", id)));
        Ok(())
    }

    /// Keep the local version of one conflict
    ///
    /// Restores the pre-merge local text and category, then pushes the
    /// restored quote best-effort. A quote removed since the cycle is left
    /// removed and nothing is pushed.
    pub async fn keep_local(&self, id: &str) -> Result<PushReport> {
        let restored = {
            let _cycle = self.cycle_lock.lock().await;
            let conflict = self.review.lock().await.decide(id, Decision::KeptLocal)?;
            self.store.lock().await.restore(&conflict.local)
        };
        self.refresh_pending().await;

        let Some(restored) = restored else {
            self.notifier.notify(Notice::info(format!(
                "Quote {} was removed locally; nothing to push.",
                id
            )));
            return Ok(PushReport::default());
        };

        let report = self.remote.push_remote(std::slice::from_ref(&restored)).await;
        if report.all_succeeded() {
            self.notifier
                .notify(Notice::info("Local version pushed to server."));
        } else {
            self.notifier
                .notify(Notice::warn("Failed to push local version to server."));
        }
        Ok(report)
    }

    /// Keep the server version of every conflict and close the review
    pub async fn keep_all_remote(&self) {
        self.review.lock().await.close();
        self.refresh_pending().await;
        self.notifier
            .notify(Notice::info("Server versions kept for all conflicts."));
    }

    /// Keep the local version of every pending conflict, then push every
    /// local quote
    pub async fn keep_all_local(&self) -> PushReport {
        let records: Vec<QuoteRecord> = {
            let _cycle = self.cycle_lock.lock().await;
            let pending: Vec<Conflict> = self.review.lock().await.close();
            let mut store = self.store.lock().await;
            for conflict in &pending {
                // removed quotes stay removed
                let _ = store.restore(&conflict.local);
            }
            store.snapshot()
        };
        self.refresh_pending().await;

        let report = self.remote.push_remote(&records).await;
        if report.all_succeeded() {
            self.notifier
                .notify(Notice::info("Local versions pushed to server."));
        } else {
            self.notifier.notify(Notice::warn(format!(
                "Failed to push {} of {} local versions.",
                report.failed,
                report.total()
            )));
        }
        report
    }

    /// Close the review without deciding anything
    pub async fn dismiss_review(&self) {
        let pending = self.review.lock().await.close();
        self.refresh_pending().await;
        tracing::debug!("Conflict review dismissed with {} undecided", pending.len());
    }

    async fn refresh_pending(&self) {
        let pending = self.review.lock().await.pending().len();
        self.state.write().await.pending_conflicts = pending;
    }
}
