//! Error handling module for shieldgate
//!
//! This module provides the error type shared by the guard pipeline and its collaborators.

mod error;

// Re-export the main error types and utilities
pub use error::{GuardError, Result};
