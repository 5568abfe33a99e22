//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Quote and store fixtures
//! - A gated in-process remote for concurrency tests
//! - Mock HTTP endpoint helpers
//! - Custom assertion macros

#[macro_use]
pub mod assertions;
pub mod mock_server;

// Re-export commonly used utilities
pub use fixtures::*;
pub use mock_server::*;
