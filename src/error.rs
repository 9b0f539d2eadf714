//! Error types for bkv
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using BkvError
pub type Result<T> = std::result::Result<T, BkvError>;

/// Unified error type for bkv operations
#[derive(Debug, Error)]
pub enum BkvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Short reads/writes and other device-level failures. Propagated, never
    /// retried. The one exception is fsync-after-append, which is downgraded
    /// to a warning (see `LogFile::sync`).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    /// Bad magic or version, corrupt or truncated record framing. Never
    /// silently tolerated; always aborts the current operation.
    #[error("format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Lock Errors
    // -------------------------------------------------------------------------
    /// Another process holds the database. Surfaced immediately on open,
    /// not retried.
    #[error("database is locked by another process (lock file exists: {})", .path.display())]
    Locked { path: PathBuf },

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    /// A data operation was attempted on an engine that is not open.
    #[error("database is not open")]
    NotOpen,
}
