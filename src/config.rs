//! Configuration for bkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a bkv database instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the database file. The advisory lock lives next to it as
    /// `<path>.lock`, and compaction uses `<path>.tmp` as scratch space.
    pub path: PathBuf,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: when to flush appends to durable storage
    pub sync_mode: SyncMode,
}

/// When appended data is flushed to durable storage.
///
/// Flushing is best-effort either way: a failed fsync is logged as a warning
/// and the append still counts as successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// fsync after every append (safest, slowest)
    #[default]
    Always,

    /// leave flushing to the operating system
    Never,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data.bkv"),
            sync_mode: SyncMode::Always,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the sync mode
    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.config.sync_mode = mode;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
