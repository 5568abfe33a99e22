//! # Sync Scheduler
//!
//! Drives the sync service: one silent cycle at startup, then one silent
//! cycle every period until stopped. Manual syncs go through [`SyncScheduler::sync_now`]
//! and queue behind any in-flight cycle.

use crate::app::remote::RemoteSource;
use crate::app::sync::{SyncReport, SyncService};
use crate::shared::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default period between background cycles
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30);

/// Periodic sync driver
#[derive(Debug)]
pub struct SyncScheduler<R: RemoteSource> {
    service: Arc<SyncService<R>>,
    period: Duration,
    handle: Option<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl<R: RemoteSource> SyncScheduler<R> {
    pub fn new(service: Arc<SyncService<R>>, period: Duration) -> Self {
        Self {
            service,
            period,
            handle: None,
            shutdown: None,
        }
    }

    pub fn service(&self) -> &Arc<SyncService<R>> {
        &self.service
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the background loop
    ///
    /// Returns false when it is already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let (tx, mut rx) = watch::channel(false);
        let service = Arc::clone(&self.service);
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("Sync scheduler started, period {:?}", period);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // failures are already reported by the service
                        let _ = service.sync_cycle(false).await;
                    }
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("Sync scheduler stopped");
        });

        self.handle = Some(handle);
        self.shutdown = Some(tx);
        true
    }

    /// Run a user-requested cycle with full notices
    pub async fn sync_now(&self) -> Result<SyncReport> {
        self.service.sync_cycle(true).await
    }

    /// Stop the loop, letting an in-flight cycle finish first
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Sync scheduler task ended abnormally: {}", e);
            }
        }
    }
}

impl<R: RemoteSource> Drop for SyncScheduler<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
