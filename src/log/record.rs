//! Log record codec
//!
//! Defines the unit of the append-only log and its exact binary framing.

use bytes::{Buf, BufMut};

use crate::error::{BkvError, Result};

/// Fixed framing prefix: type (1) + key_len (4) + value_len (4)
pub const RECORD_HEADER_SIZE: usize = 9;

/// Wire tag for a Put record
const TAG_PUT: u8 = 1;

/// Wire tag for a Delete record
const TAG_DELETE: u8 = 2;

/// A single entry in the append-only log.
///
/// Records are immutable once written: a logical update appends a new `Put`
/// for the same key, a logical delete appends a `Delete` tombstone. The
/// variant tag is authoritative; a `Put` with an empty value is a live,
/// empty value, never a deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A live key-value pair
    Put { key: String, value: Vec<u8> },

    /// A tombstone marking the key as deleted
    Delete { key: String },
}

impl Record {
    /// The key this record applies to
    pub fn key(&self) -> &str {
        match self {
            Record::Put { key, .. } => key,
            Record::Delete { key } => key,
        }
    }

    /// Exact size of the encoded form: 9 + key_len + value_len
    pub fn encoded_len(&self) -> usize {
        match self {
            Record::Put { key, value } => RECORD_HEADER_SIZE + key.len() + value.len(),
            Record::Delete { key } => RECORD_HEADER_SIZE + key.len(),
        }
    }

    /// Encode into one contiguous buffer.
    ///
    /// Format: type (1) + key_len (4, big-endian) + value_len (4,
    /// big-endian) + key bytes + value bytes. No padding, no checksum.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let (tag, key, value): (u8, &str, &[u8]) = match self {
            Record::Put { key, value } => (TAG_PUT, key, value),
            Record::Delete { key } => (TAG_DELETE, key, &[]),
        };

        // The length fields are u32 on the wire; anything larger cannot be
        // framed.
        let key_len = u32::try_from(key.len())
            .map_err(|_| BkvError::Format(format!("key too large to frame: {} bytes", key.len())))?;
        let value_len = u32::try_from(value.len()).map_err(|_| {
            BkvError::Format(format!("value too large to frame: {} bytes", value.len()))
        })?;

        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.put_u8(tag);
        buf.put_u32(key_len);
        buf.put_u32(value_len);
        buf.put_slice(key.as_bytes());
        buf.put_slice(value);

        Ok(buf)
    }

    /// Decode one record from the front of `bytes`.
    ///
    /// Returns the record and the number of bytes consumed, so a log-scan
    /// cursor can advance past it. Fails with `Format` on a truncated
    /// input (fewer bytes than the declared lengths require), an unknown
    /// type tag, or a key that is not valid UTF-8.
    pub fn decode(bytes: &[u8]) -> Result<(Record, usize)> {
        if bytes.len() < RECORD_HEADER_SIZE {
            return Err(BkvError::Format(format!(
                "record header truncated: expected {} bytes, got {}",
                RECORD_HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = &bytes[..];
        let tag = buf.get_u8();
        if tag != TAG_PUT && tag != TAG_DELETE {
            return Err(BkvError::Format(format!("unknown record type: {}", tag)));
        }

        let key_len = buf.get_u32() as usize;
        let value_len = buf.get_u32() as usize;

        // Length fields are untrusted input: size the frame in u64 so
        // absurd declared lengths cannot overflow the arithmetic.
        let total = RECORD_HEADER_SIZE as u64 + key_len as u64 + value_len as u64;
        if (bytes.len() as u64) < total {
            return Err(BkvError::Format(format!(
                "record truncated: declared {} bytes, only {} available",
                total,
                bytes.len()
            )));
        }
        let total_len = total as usize;

        let key_bytes = &bytes[RECORD_HEADER_SIZE..RECORD_HEADER_SIZE + key_len];
        let key = String::from_utf8(key_bytes.to_vec())
            .map_err(|e| BkvError::Format(format!("record key is not valid UTF-8: {}", e)))?;

        let record = match tag {
            TAG_PUT => {
                let value = bytes[RECORD_HEADER_SIZE + key_len..total_len].to_vec();
                Record::Put { key, value }
            }
            // A Delete never carries a value; if one is declared anyway we
            // still consume its framing so the scan cursor stays exact.
            _ => Record::Delete { key },
        };

        Ok((record, total_len))
    }
}
