//! Tests for the file header codec
//!
//! These tests verify:
//! - Exact wire layout (magic, big-endian version, reserved bytes)
//! - Round-trip encoding/decoding
//! - Rejection of short, mislabeled, and wrong-version headers

use bkv::log::{Header, HEADER_SIZE, MAGIC, VERSION};
use bkv::BkvError;

// =============================================================================
// Wire Layout Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let bytes = Header::new().encode();

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(&bytes[0..4], b"BKV1");
    assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), VERSION);
    assert_eq!(&bytes[6..8], &[0, 0]);
}

#[test]
fn test_round_trip() {
    let header = Header::new();
    let decoded = Header::decode(&header.encode()).unwrap();

    assert_eq!(decoded, header);
    assert_eq!(decoded.magic, *MAGIC);
    assert_eq!(decoded.version, VERSION);
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_decode_too_short() {
    let result = Header::decode(&[0u8; 5]);
    assert!(matches!(result, Err(BkvError::Format(_))));
}

#[test]
fn test_decode_empty() {
    assert!(matches!(Header::decode(&[]), Err(BkvError::Format(_))));
}

#[test]
fn test_decode_bad_magic() {
    let mut bytes = Header::new().encode();
    bytes[0] = b'X';

    assert!(matches!(Header::decode(&bytes), Err(BkvError::Format(_))));
}

#[test]
fn test_decode_wrong_version() {
    let mut bytes = Header::new().encode();
    bytes[4..6].copy_from_slice(&2u16.to_be_bytes());

    assert!(matches!(Header::decode(&bytes), Err(BkvError::Format(_))));
}

// =============================================================================
// Tolerance Tests
// =============================================================================

#[test]
fn test_decode_ignores_reserved_bytes() {
    let mut bytes = Header::new().encode();
    bytes[6] = 0xAB;
    bytes[7] = 0xCD;

    assert!(Header::decode(&bytes).is_ok());
}

#[test]
fn test_decode_from_longer_buffer() {
    // Decoding from the front of a larger buffer, e.g. a whole-file read
    let mut bytes = Header::new().encode().to_vec();
    bytes.extend_from_slice(b"record data follows");

    assert!(Header::decode(&bytes).is_ok());
}
