//! Storage error types.
//!
//! Durable-tier failures are non-fatal by design: the cache and history
//! stores catch and log them rather than letting a quota or I/O problem
//! abort a quiz session.

use thiserror::Error;

/// Errors from a durable store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage rejected a write (quota, I/O, permissions).
    #[error("durable write failed for key '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    /// The backing storage could not be opened or read.
    #[error("durable store unavailable: {0}")]
    Unavailable(String),
}
