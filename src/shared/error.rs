//! Shared Error Types
//!
//! This module defines the error type used across the quote store, the remote
//! adapter and the sync service. Every variant maps to a recoverable failure:
//! nothing here is fatal to a running service, callers degrade to a notice and
//! a safe fallback state.
//!
//! # Error Categories
//!
//! - `Validation` - empty required field on add or import
//! - `Storage` - durable slot write/read failure
//! - `Parse` - malformed persisted or imported JSON
//! - `Network` - remote fetch or push failure
//! - `NotFound` - unknown quote identifier
//!
//! # Usage
//!
//! ```rust
//! use quote_sync::shared::error::QuoteError;
//!
//! let error = QuoteError::validation("text", "Quote text cannot be empty");
//! assert!(error.is_validation());
//! ```
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Errors raised by quote storage and synchronization
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// A required field was empty or malformed
    #[error("Validation error in field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Writing to or reading from a storage slot failed
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message
        message: String,
    },

    /// JSON could not be parsed into the expected shape
    #[error("Parse error: {message}")]
    Parse {
        /// Human-readable error message
        message: String,
    },

    /// The remote endpoint failed or returned a non-success status
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message
        message: String,
    },

    /// No quote with the given identifier exists
    #[error("Quote not found: {id}")]
    NotFound {
        /// The identifier that was looked up
        id: String,
    },
}

impl QuoteError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for QuoteError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<reqwest::Error> for QuoteError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::network(format!("{} ({})", err, status)),
            None => Self::network(err.to_string()),
        }
    }
}
