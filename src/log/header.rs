//! File header codec
//!
//! Every database file begins with exactly one 8-byte header at offset 0,
//! written once when the file is created and never mutated. Magic and
//! version must match the engine's constants exactly; there is no forward
//! or backward compatibility.

use bytes::{Buf, BufMut};

use crate::error::{BkvError, Result};

/// Magic bytes identifying a bkv database file
pub const MAGIC: &[u8; 4] = b"BKV1";

/// Current file format version
pub const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + Reserved (2) = 8 bytes
pub const HEADER_SIZE: usize = 8;

/// The fixed file header.
///
/// Wire layout: magic at bytes 0-3, version as a big-endian u16 at bytes
/// 4-5, bytes 6-7 reserved (written as zero, ignored on decode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u16,
}

impl Header {
    /// A header carrying the current magic and version
    pub fn new() -> Self {
        Self {
            magic: *MAGIC,
            version: VERSION,
        }
    }

    /// Encode to the fixed 8-byte wire form
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut buf = &mut bytes[..];
        buf.put_slice(&self.magic);
        buf.put_u16(self.version);
        // bytes 6-7 stay zero (reserved)
        bytes
    }

    /// Decode and validate a header.
    ///
    /// Fails with `Format` if the input is shorter than 8 bytes, the magic
    /// does not match, or the version is not the supported one.
    pub fn decode(bytes: &[u8]) -> Result<Header> {
        if bytes.len() < HEADER_SIZE {
            return Err(BkvError::Format(format!(
                "header truncated: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if &magic != MAGIC {
            return Err(BkvError::Format(format!(
                "invalid magic: expected \"BKV1\", got {:?}",
                &bytes[0..4]
            )));
        }

        let mut buf = &bytes[4..];
        let version = buf.get_u16();
        if version != VERSION {
            return Err(BkvError::Format(format!(
                "unsupported format version: {} (supported: {})",
                version, VERSION
            )));
        }

        Ok(Header { magic, version })
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
