//! # Sync State
//!
//! Snapshot of the sync service's status, for status indicators.

/// Current synchronization state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// A cycle is in flight
    pub is_syncing: bool,
    /// RFC3339 time of the last completed cycle
    pub last_sync: Option<String>,
    /// Error from the most recent cycle, cleared on success
    pub last_error: Option<String>,
    /// Completed cycles, including discarded ones
    pub cycles_completed: u64,
    /// Fetch results thrown away because the store was replaced meanwhile
    pub discarded_results: u64,
    /// Conflicts still waiting for a decision
    pub pending_conflicts: usize,
}

impl SyncState {
    /// Short indicator text: `syncing...`, `error`, `last: <time>` or `idle`
    pub fn indicator(&self) -> String {
        if self.is_syncing {
            "syncing...".to_string()
        } else if self.last_error.is_some() {
            "error".to_string()
        } else if let Some(last) = &self.last_sync {
            let time = chrono::DateTime::parse_from_rfc3339(last)
                .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|_| last.clone());
            format!("last: {}", time)
        } else {
            "idle".to_string()
        }
    }
}
