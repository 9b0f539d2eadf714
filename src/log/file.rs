//! Block file I/O
//!
//! Low-level access to the database file: open-with-lock, positioned reads,
//! append-with-sync, close-with-unlock.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncMode;
use crate::error::{BkvError, Result};

/// Suffix of the advisory lock file, next to the data file
const LOCK_SUFFIX: &str = ".lock";

/// Handle on the database file plus its advisory lock.
///
/// At most one `LogFile` may exist per path at a time: `open` creates
/// `<path>.lock` with create-if-absent-else-fail semantics, and the lock
/// file's presence is the cross-process mutual-exclusion signal. The lock is
/// removed on `close` and on drop, so error paths release it too.
pub struct LogFile {
    /// The data file, open for read and write
    file: File,

    /// Path of the data file
    path: PathBuf,

    /// Path of the sibling lock file
    lock_path: PathBuf,

    /// Whether this handle created the lock file (and must remove it)
    locked: bool,

    /// When appends are flushed to durable storage
    sync_mode: SyncMode,
}

impl LogFile {
    /// Open the data file (creating it if absent) and acquire the lock.
    ///
    /// Fails with `Locked` if another handle already holds `<path>.lock`;
    /// the data file descriptor is closed before returning in that case.
    pub fn open(path: &Path, sync_mode: SyncMode) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let lock_path = lock_path_for(path);
        let mut lock_file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                drop(file);
                return Err(BkvError::Locked { path: lock_path });
            }
            Err(e) => {
                drop(file);
                return Err(e.into());
            }
        };

        // Process id as a human-readable hint for whoever finds a stale
        // lock. Best-effort: the lock is the file's existence, not its body.
        if let Err(e) = write!(lock_file, "{}", std::process::id()) {
            tracing::debug!("failed to write pid hint to {}: {}", lock_path.display(), e);
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            lock_path,
            locked: true,
            sync_mode,
        })
    }

    /// Release the lock (best-effort) and close the file
    pub fn close(mut self) {
        self.release_lock();
    }

    /// Read exactly `length` bytes starting at `offset`.
    ///
    /// A `length` of 0 returns an empty buffer without touching the file.
    /// Hitting end-of-file before `length` bytes are read is an `Io` error
    /// of kind `UnexpectedEof`.
    pub fn read_block(&mut self, offset: u64, length: usize) -> Result<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }

        self.file.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; length];
        let mut read = 0;
        while read < length {
            match self.file.read(&mut buf[read..]) {
                Ok(0) => {
                    return Err(BkvError::Io(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        format!(
                            "unexpected EOF reading block at offset {}: expected {} bytes, got {}",
                            offset, length, read
                        ),
                    )));
                }
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(buf)
    }

    /// Append `data` at end-of-file and return the offset where it begins.
    ///
    /// Partial writes are retried until all of `data` is written; a write
    /// that reports zero bytes written is a non-recoverable device
    /// condition. Under `SyncMode::Always` the append is followed by a
    /// best-effort flush to durable storage.
    pub fn append_block(&mut self, data: &[u8]) -> Result<u64> {
        let offset = self.file.seek(SeekFrom::End(0))?;

        let mut written = 0;
        while written < data.len() {
            match self.file.write(&data[written..]) {
                Ok(0) => {
                    return Err(BkvError::Io(io::Error::new(
                        ErrorKind::WriteZero,
                        format!(
                            "write returned 0 bytes at offset {}: {} of {} written",
                            offset,
                            written,
                            data.len()
                        ),
                    )));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if self.sync_mode == SyncMode::Always {
            self.sync();
        }

        Ok(offset)
    }

    /// Best-effort flush to durable storage.
    ///
    /// Failure is logged as a warning, not propagated: the append already
    /// counts as successful. Callers that need a hard guarantee must check
    /// the log.
    pub fn sync(&mut self) {
        if let Err(e) = self.file.sync_all() {
            tracing::warn!("fsync failed on {}: {}", self.path.display(), e);
        }
    }

    /// Current size of the data file in bytes
    pub fn size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the advisory lock file
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Remove the lock file if this handle created it, ignoring errors
    fn release_lock(&mut self) {
        if self.locked {
            let _ = fs::remove_file(&self.lock_path);
            self.locked = false;
        }
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        self.release_lock();
    }
}

/// Lock file path for a database path: `<path>.lock`
pub(crate) fn lock_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(LOCK_SUFFIX);
    PathBuf::from(os)
}
