//! # Application
//!
//! Everything that runs: storage slots, the local store, the remote adapter
//! and the sync machinery. The `quote-sync` binary wires these together.

pub mod config;
pub mod local_store;
pub mod remote;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use local_store::{CategoryFilter, LocalStore};
