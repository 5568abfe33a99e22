//! Quote Sync - Main Library
//!
//! A local-first quote collection that stays usable offline and reconciles
//! with a remote create/list endpoint in the background.
//!
//! # Module Structure
//!
//! - **`shared`** - Types with no runtime dependencies
//!   - Quote records and id generation
//!   - Error types
//!   - Configuration and its builder
//!
//! - **`app`** - The running application
//!   - Key-value storage slots (file and memory backed)
//!   - Local store: CRUD, filters, random pick, import/export
//!   - Remote adapter (HTTP and in-memory)
//!   - Sync service, conflict review and scheduler
//!
//! # Usage
//!
//! ```rust,no_run
//! use quote_sync::app::config::Config;
//! use quote_sync::app::local_store::LocalStore;
//! use quote_sync::app::remote::HttpRemote;
//! use quote_sync::app::storage::{FileStorage, MemoryStorage};
//! use quote_sync::app::sync::{notifier::TracingNotifier, SyncScheduler, SyncService};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None)?;
//! let durable = Arc::new(FileStorage::open(config.data_dir())?);
//! let store = LocalStore::open(durable, Arc::new(MemoryStorage::new()));
//! let remote = HttpRemote::new(config.app())?;
//!
//! let service = Arc::new(SyncService::new(store, remote, Arc::new(TracingNotifier)));
//! let mut scheduler = SyncScheduler::new(service, config.sync_interval());
//! scheduler.start();
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`shared::Result`]. No failure is fatal: storage
//! and network errors leave the in-memory collection usable and are reported
//! as notices.

/// Shared types and data structures
pub mod shared;

/// Storage, sync and the local store
pub mod app;
