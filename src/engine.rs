//! Engine Module
//!
//! The core storage engine that coordinates the log components.
//!
//! ## Responsibilities
//! - Open/close the locked database file
//! - Validate or create the file header
//! - Rebuild the in-memory index by replaying the log
//! - Serve get/set/delete through the index
//! - Reclaim space with explicit compaction

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{BkvError, Result};
use crate::log::{lock_path_for, Header, LogFile, Record, HEADER_SIZE};

/// Suffix of the temporary file used during compaction
const TMP_SUFFIX: &str = ".tmp";

/// Location of one live record in the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Offset of the record's first byte
    pub offset: u64,

    /// Full serialized length of the record
    pub length: u32,
}

/// The main storage engine
///
/// ## Lifecycle
///
/// Closed (initial) -> `open()` -> Open -> `close()` -> Closed. All data
/// operations (`get`, `set`, `delete`, `compact`) require the Open state and
/// fail with `NotOpen` otherwise.
///
/// ## Ownership Model
///
/// One engine instance owns one open database file exclusively: the index
/// and the file handle live behind `&mut self`, and cross-process exclusion
/// comes from the advisory lock file. There is no internal synchronization;
/// the design assumes a single caller per open file.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Locked handle on the data file; `None` while Closed
    file: Option<LogFile>,

    /// key → location of its most recent live Put record. Rebuilt from the
    /// log on every open, never persisted: the log is the single source of
    /// truth.
    index: BTreeMap<String, IndexEntry>,
}

impl Engine {
    /// Create a Closed engine with the given config. No I/O happens until
    /// `open`.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            file: None,
            index: BTreeMap::new(),
        }
    }

    /// Open a database at `path` with default config (convenience method)
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        let config = Config::builder().path(path).build();
        let mut engine = Self::new(config);
        engine.open()?;
        Ok(engine)
    }

    /// Open the database: acquire the file and lock, validate or create the
    /// header, then rebuild the index by replaying every record in the log.
    ///
    /// On any failure the partially-acquired handle is dropped, which
    /// releases the lock.
    pub fn open(&mut self) -> Result<()> {
        let mut file = LogFile::open(&self.config.path, self.config.sync_mode)?;

        let size = file.size()?;
        if size == 0 {
            // Fresh database: stamp the header.
            file.append_block(&Header::new().encode())?;
        } else {
            // An existing file must start with a valid header. Reading at
            // most 8 bytes lets the decoder report a too-short file as a
            // format error instead of a short read.
            let header_len = size.min(HEADER_SIZE as u64) as usize;
            let bytes = file.read_block(0, header_len)?;
            let header = Header::decode(&bytes)?;
            tracing::debug!(
                "opened existing database {} (format version {})",
                self.config.path.display(),
                header.version
            );
        }

        let index = Self::replay(&mut file)?;
        tracing::debug!(
            "replayed log {}: {} live keys",
            self.config.path.display(),
            index.len()
        );

        self.file = Some(file);
        self.index = index;
        Ok(())
    }

    /// Rebuild the index from the log.
    ///
    /// Scans every record after the header: a Put inserts/overwrites the
    /// key's location (later records supersede earlier ones), a Delete
    /// removes the key. The scan must land exactly on end-of-file; a record
    /// whose declared lengths run past it fails with a `Format` error.
    /// A truncated log is never silently accepted.
    fn replay(file: &mut LogFile) -> Result<BTreeMap<String, IndexEntry>> {
        let mut index = BTreeMap::new();

        let size = file.size()?;
        let start = HEADER_SIZE as u64;
        if size <= start {
            return Ok(index);
        }

        let tail = file.read_block(start, (size - start) as usize)?;
        let mut cursor = 0usize;

        while cursor < tail.len() {
            let (record, consumed) = Record::decode(&tail[cursor..])?;

            match record {
                Record::Put { key, .. } => {
                    index.insert(
                        key,
                        IndexEntry {
                            offset: start + cursor as u64,
                            length: consumed as u32,
                        },
                    );
                }
                Record::Delete { key } => {
                    index.remove(&key);
                }
            }

            cursor += consumed;
        }

        Ok(index)
    }

    /// Set `key` to `value`, appending a Put record and updating the index.
    ///
    /// Empty keys and empty values are both legal and round-trip exactly.
    pub fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let file = self.file.as_mut().ok_or(BkvError::NotOpen)?;

        let record = Record::Put {
            key: key.to_string(),
            value: value.to_vec(),
        };
        let encoded = record.encode()?;

        let offset = file.append_block(&encoded)?;
        self.index.insert(
            key.to_string(),
            IndexEntry {
                offset,
                length: encoded.len() as u32,
            },
        );

        Ok(())
    }

    /// Get the current value for `key`, or `None` if the key is absent.
    ///
    /// Absence is not an error. The record is read back through the index;
    /// the index pointing at anything but a decodable Put means index and
    /// log have diverged, which surfaces as a `Format` error rather than a
    /// silent miss.
    pub fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let file = self.file.as_mut().ok_or(BkvError::NotOpen)?;

        let entry = match self.index.get(key) {
            Some(entry) => *entry,
            None => return Ok(None),
        };

        let bytes = file.read_block(entry.offset, entry.length as usize)?;
        let (record, _) = Record::decode(&bytes)?;

        match record {
            Record::Put { value, .. } => Ok(Some(value)),
            Record::Delete { .. } => Err(BkvError::Format(format!(
                "index for key {:?} points at a tombstone",
                key
            ))),
        }
    }

    /// Delete `key`: append a tombstone and drop the key from the index.
    ///
    /// Deleting a key that is not present is a no-op; no tombstone is
    /// written, so repeated deletes of an unknown key cannot grow the log.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        let file = self.file.as_mut().ok_or(BkvError::NotOpen)?;

        if !self.index.contains_key(key) {
            return Ok(());
        }

        let encoded = Record::Delete {
            key: key.to_string(),
        }
        .encode()?;
        file.append_block(&encoded)?;
        self.index.remove(key);

        Ok(())
    }

    /// Rewrite the log so it holds only the header plus the current live
    /// record of every indexed key, dropping tombstones and superseded Puts.
    ///
    /// Live records are copied byte-for-byte into `<path>.tmp`, which then
    /// replaces the original. Record offsets shift in the new file, so the
    /// index is rebuilt from the offsets each copy actually lands at; old
    /// offsets are never reused.
    pub fn compact(&mut self) -> Result<()> {
        if self.file.is_none() {
            return Err(BkvError::NotOpen);
        }

        let tmp_path = tmp_path_for(&self.config.path);

        // An interrupted compaction can leave a stale tmp file (and its
        // lock) behind. We hold the main lock, so they are ours to clear;
        // appending to a stale tmp would corrupt the copy.
        remove_if_exists(&tmp_path)?;
        remove_if_exists(&lock_path_for(&tmp_path))?;

        let mut tmp = LogFile::open(&tmp_path, self.config.sync_mode)?;
        tmp.append_block(&Header::new().encode())?;

        let mut new_index = BTreeMap::new();
        let old_size;
        {
            let file = self.file.as_mut().ok_or(BkvError::NotOpen)?;
            old_size = file.size()?;

            for (key, entry) in &self.index {
                let bytes = file.read_block(entry.offset, entry.length as usize)?;
                let offset = tmp.append_block(&bytes)?;
                new_index.insert(
                    key.clone(),
                    IndexEntry {
                        offset,
                        length: entry.length,
                    },
                );
            }
        }

        let new_size = tmp.size()?;
        tmp.close();
        if let Some(file) = self.file.take() {
            file.close();
        }

        fs::remove_file(&self.config.path)?;
        fs::rename(&tmp_path, &self.config.path)?;

        self.file = Some(LogFile::open(&self.config.path, self.config.sync_mode)?);
        self.index = new_index;

        tracing::info!(
            "compacted {}: {} live records, {} -> {} bytes",
            self.config.path.display(),
            self.index.len(),
            old_size,
            new_size
        );

        Ok(())
    }

    /// Close the database: best-effort final sync, release the lock, drop
    /// the index.
    ///
    /// Closing an engine that is not open is a no-op, so `close` is safe to
    /// call on every code path.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.sync();
            file.close();
            self.index.clear();
            tracing::debug!("closed database {}", self.config.path.display());
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for the CLI, testing and debugging)
    // =========================================================================

    /// Whether the engine is currently open
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Whether `key` currently has a live value
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All live keys, in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the database holds no live keys
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The database file path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// The configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current physical size of the database file in bytes
    pub fn file_size(&self) -> Result<u64> {
        self.file.as_ref().ok_or(BkvError::NotOpen)?.size()
    }
}

/// Compaction scratch path for a database path: `<path>.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(TMP_SUFFIX);
    PathBuf::from(os)
}

/// Remove a file if it exists, propagating any other error
fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
