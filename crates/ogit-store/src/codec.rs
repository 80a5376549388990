//! Object envelope codec and storage compression.
//!
//! Envelope format:
//! ```text
//! <kind> SP <decimal payload length> NUL <payload>
//! ```
//!
//! The identifier of an object is the SHA-1 of the envelope bytes. Stored
//! objects are the zlib-compressed envelope; compression never participates
//! in hashing.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ogit_crypto::ContentHasher;
use ogit_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};

/// A decoded envelope: kind tag plus payload bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The payload bytes (everything after the NUL).
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Create a new envelope from kind and payload.
    pub fn new(kind: ObjectKind, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    /// Encode `payload` under `kind`, returning the identifier and the
    /// envelope bytes.
    pub fn encode(kind: ObjectKind, payload: &[u8]) -> (ObjectId, Vec<u8>) {
        let len = payload.len().to_string();
        let tag = kind.tag();
        let mut bytes = Vec::with_capacity(tag.len() + len.len() + 2 + payload.len());
        bytes.extend_from_slice(tag);
        bytes.push(b' ');
        bytes.extend_from_slice(len.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(payload);
        (ContentHasher::hash_envelope(&bytes), bytes)
    }

    /// Envelope bytes for this object.
    pub fn to_bytes(&self) -> Vec<u8> {
        Self::encode(self.kind, &self.payload).1
    }

    /// Content-addressed identifier of this object.
    pub fn compute_id(&self) -> ObjectId {
        ContentHasher::hash_object(self.kind, &self.payload)
    }

    /// Decode envelope bytes.
    ///
    /// Fails if the space or NUL delimiter is missing, the kind tag is not
    /// one of `blob`, `tree`, `commit`, or the declared length is not the
    /// canonical decimal count of payload bytes.
    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        let space = bytes
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| StoreError::format("envelope", "missing space after type tag"))?;
        let nul = bytes[space..]
            .iter()
            .position(|&b| b == 0)
            .map(|offset| space + offset)
            .ok_or_else(|| StoreError::format("envelope", "missing NUL after length"))?;

        let tag = &bytes[..space];
        let kind = ObjectKind::from_tag(tag).ok_or_else(|| {
            StoreError::format(
                "envelope",
                format!("unknown type tag {:?}", String::from_utf8_lossy(tag)),
            )
        })?;

        let declared = parse_length(&bytes[space + 1..nul])?;
        let payload = &bytes[nul + 1..];
        if declared != payload.len() {
            return Err(StoreError::format(
                "envelope",
                format!(
                    "declared length {declared} does not match payload length {}",
                    payload.len()
                ),
            ));
        }

        Ok(Self {
            kind,
            payload: payload.to_vec(),
        })
    }
}

fn parse_length(field: &[u8]) -> StoreResult<usize> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(StoreError::format(
            "envelope",
            format!(
                "length field {:?} is not a decimal number",
                String::from_utf8_lossy(field)
            ),
        ));
    }
    if field.len() > 1 && field[0] == b'0' {
        return Err(StoreError::format(
            "envelope",
            format!(
                "length field {:?} has a leading zero",
                String::from_utf8_lossy(field)
            ),
        ));
    }
    // All-digit ASCII is valid UTF-8.
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| StoreError::format("envelope", "length field overflows"))
}

/// Compress bytes with zlib.
pub fn compress(bytes: &[u8]) -> StoreResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Decompress zlib bytes.
pub fn decompress(bytes: &[u8]) -> StoreResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| StoreError::format("compressed object", e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = ObjectKind> {
        prop_oneof![
            Just(ObjectKind::Blob),
            Just(ObjectKind::Tree),
            Just(ObjectKind::Commit),
        ]
    }

    #[test]
    fn encode_layout() {
        let (_, bytes) = Envelope::encode(ObjectKind::Blob, b"hello");
        assert_eq!(bytes, b"blob 5\0hello");
    }

    #[test]
    fn encode_empty_payload() {
        let (id, bytes) = Envelope::encode(ObjectKind::Tree, b"");
        assert_eq!(bytes, b"tree 0\0");
        assert_eq!(id.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn id_matches_git() {
        let (id, _) = Envelope::encode(ObjectKind::Blob, b"hello\n");
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert_eq!(Envelope::new(ObjectKind::Blob, b"hello\n".to_vec()).compute_id(), id);
    }

    #[test]
    fn decode_payload_may_contain_nul_and_space() {
        let (_, bytes) = Envelope::encode(ObjectKind::Blob, b"a b\0c");
        let env = Envelope::decode(&bytes).unwrap();
        assert_eq!(env.payload, b"a b\0c");
    }

    #[test]
    fn decode_rejects_short_length() {
        let err = Envelope::decode(b"blob 3\0hello").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn decode_rejects_long_length() {
        let err = Envelope::decode(b"blob 9\0hello").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn decode_rejects_missing_space() {
        assert!(Envelope::decode(b"blob5\0hello").unwrap_err().is_format());
    }

    #[test]
    fn decode_rejects_missing_nul() {
        assert!(Envelope::decode(b"blob 5hello").unwrap_err().is_format());
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        assert!(Envelope::decode(b"tag 5\0hello").unwrap_err().is_format());
    }

    #[test]
    fn decode_rejects_non_decimal_length() {
        assert!(Envelope::decode(b"blob +5\0hello").unwrap_err().is_format());
        assert!(Envelope::decode(b"blob \0").unwrap_err().is_format());
        assert!(Envelope::decode(b"blob 0x5\0hello").unwrap_err().is_format());
    }

    #[test]
    fn decode_rejects_leading_zero_length() {
        assert!(Envelope::decode(b"blob 05\0hello").unwrap_err().is_format());
        assert!(Envelope::decode(b"tree 00\0").unwrap_err().is_format());
        assert!(Envelope::decode(b"tree 0\0").unwrap().payload.is_empty());
    }

    #[test]
    fn compression_roundtrip() {
        let data = b"blob 11\0hello world".repeat(10);
        let compressed = compress(&data).unwrap();
        assert_ne!(compressed, data);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn decompress_garbage_is_format_error() {
        assert!(decompress(b"definitely not zlib").unwrap_err().is_format());
    }

    proptest! {
        #[test]
        fn envelope_roundtrip(
            kind in kind_strategy(),
            payload in proptest::collection::vec(any::<u8>(), 0..1024),
        ) {
            let (id, bytes) = Envelope::encode(kind, &payload);
            let env = Envelope::decode(&bytes).unwrap();
            prop_assert_eq!(env.kind, kind);
            prop_assert_eq!(&env.payload, &payload);
            prop_assert_eq!(env.compute_id(), id);
        }

        #[test]
        fn truncated_envelope_is_rejected(
            payload in proptest::collection::vec(any::<u8>(), 1..256),
        ) {
            let (_, mut bytes) = Envelope::encode(ObjectKind::Blob, &payload);
            bytes.pop();
            prop_assert!(Envelope::decode(&bytes).unwrap_err().is_format());
        }
    }
}
