//! Append-Only Log Module
//!
//! The single-file storage format and the low-level file access everything
//! above it builds on.
//!
//! ## Responsibilities
//! - Fixed 8-byte file header (magic + version)
//! - Binary record framing for puts and delete tombstones
//! - Locked file handle: positioned reads, appends, durability
//!
//! ## File Format
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Header (8 bytes)                              │
//! │ ┌────────────┬─────────────┬────────────────┐ │
//! │ │ "BKV1" (4) │ Version (2) │ Reserved (2)   │ │
//! │ └────────────┴─────────────┴────────────────┘ │
//! ├───────────────────────────────────────────────┤
//! │ Record 1                                      │
//! │ ┌─────────┬───────────┬───────────┬────┬────┐ │
//! │ │ Type (1)│ KeyLen (4)│ ValLen (4)│ Key│ Val│ │
//! │ └─────────┴───────────┴───────────┴────┴────┘ │
//! ├───────────────────────────────────────────────┤
//! │ Record 2 ...                                  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! All integers are big-endian. Records run back-to-back with no padding or
//! separators, terminating exactly at end-of-file.

mod file;
mod header;
mod record;

pub use file::LogFile;
pub use header::{Header, HEADER_SIZE, MAGIC, VERSION};
pub use record::{Record, RECORD_HEADER_SIZE};

pub(crate) use file::lock_path_for;
