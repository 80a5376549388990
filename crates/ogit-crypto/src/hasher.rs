use ogit_types::{ObjectId, ObjectKind};
use sha1::{Digest, Sha1};

/// SHA-1 content hasher for object envelopes.
///
/// The identifier of an object is the digest of its full envelope,
/// `<kind> <len>\0<payload>`. [`ContentHasher::hash_object`] computes the
/// same digest without materializing the envelope.
pub struct ContentHasher;

impl ContentHasher {
    /// Hash an already-encoded envelope.
    pub fn hash_envelope(envelope: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(envelope);
        ObjectId::from_hash(hasher.finalize().into())
    }

    /// Hash the envelope for `kind` and `payload` by streaming the header and
    /// payload into the digest.
    pub fn hash_object(kind: ObjectKind, payload: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(kind.tag());
        hasher.update(b" ");
        hasher.update(payload.len().to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(payload);
        ObjectId::from_hash(hasher.finalize().into())
    }
}
