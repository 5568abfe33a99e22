//! Status notices emitted by the sync service
//!
//! A [`Notifier`] is the seam to whatever displays status to the user. The
//! sync service calls it in cycle order, so notices arrive serialized.

use crate::app::sync::conflict_resolver::Conflict;
use std::fmt;
use tokio::sync::mpsc;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Transient, fine to hide after a few seconds
    Info,
    /// Should stay visible until replaced
    Warn,
}

/// A user-facing status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warn,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Receives status notices and conflict prompts
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    /// Called when a cycle opened a review; UIs prompt the user here
    fn conflicts_detected(&self, _conflicts: &[Conflict]) {}
}

/// Forwards notices to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::info!("{}", notice.message),
            NoticeLevel::Warn => tracing::warn!("{}", notice.message),
        }
    }

    fn conflicts_detected(&self, conflicts: &[Conflict]) {
        for conflict in conflicts {
            tracing::warn!(
                "Conflict on quote {}: local \"{}\" ({}) vs server \"{}\" ({})",
                conflict.id,
                conflict.local.text,
                conflict.local.category,
                conflict.remote.text,
                conflict.remote.category
            );
        }
    }
}

/// Event delivered by [`ChannelNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Notice(Notice),
    ConflictsDetected(Vec<Conflict>),
}

/// Sends notices over an unbounded channel, in emission order
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // receiver gone means nobody is listening anymore
        let _ = self.tx.send(SyncEvent::Notice(notice));
    }

    fn conflicts_detected(&self, conflicts: &[Conflict]) {
        let _ = self.tx.send(SyncEvent::ConflictsDetected(conflicts.to_vec()));
    }
}
