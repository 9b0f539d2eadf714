//! # bkv
//!
//! A minimal embedded key-value store built on a single append-only log:
//! - One data file, one advisory lock file
//! - In-memory index rebuilt by replaying the log on open
//! - Logical deletes as tombstone records
//! - Explicit compaction to reclaim space
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                     Engine                      │
//! │          index: key → {offset, length}          │
//! └────────────┬───────────────────────┬────────────┘
//!              │ encode/decode         │ read/append
//!              ▼                       ▼
//!      ┌───────────────┐      ┌────────────────┐
//!      │ Header/Record │      │    LogFile     │
//!      │    codecs     │      │  (data + lock) │
//!      └───────────────┘      └───────┬────────┘
//!                                     │
//!                                     ▼
//!                          single append-only file
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BkvError, Result};
pub use config::{Config, SyncMode};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
