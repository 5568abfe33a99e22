//! Shared Module
//!
//! Types shared by the store, the remote adapter and the sync service: the
//! quote record, the crate error type and the configuration.

/// Quote record data structure
pub mod quote;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use quote::{generate_id, now_timestamp, QuoteRecord};
pub use error::{QuoteError, Result};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
