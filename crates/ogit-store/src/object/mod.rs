//! Typed object model.
//!
//! Each object kind implements [`ObjectPayload`]: a payload codec plus the
//! kind tag it is stored under. [`Object`] is the closed set of kinds a
//! decoded envelope dispatches to.

pub mod blob;
pub mod commit;
pub mod kvlm;
pub mod tree;

pub use blob::Blob;
pub use commit::{Commit, CommitBuilder};
pub use kvlm::Kvlm;
pub use tree::{EntryMode, Tree, TreeEntry};

use ogit_crypto::ContentHasher;
use ogit_types::{ObjectId, ObjectKind};

use crate::codec::Envelope;
use crate::error::{StoreError, StoreResult};

/// Payload codec for one object kind.
pub trait ObjectPayload: Sized {
    /// The envelope tag this type is stored under.
    const KIND: ObjectKind;

    /// Encode the object into payload bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Decode payload bytes into an object.
    fn deserialize(payload: &[u8]) -> StoreResult<Self>;

    /// Wrap the serialized payload in an envelope.
    fn to_envelope(&self) -> Envelope {
        Envelope::new(Self::KIND, self.serialize())
    }

    /// Content-addressed identifier of this object.
    fn id(&self) -> ObjectId {
        ContentHasher::hash_object(Self::KIND, &self.serialize())
    }

    /// Decode from an envelope, checking the kind tag.
    fn from_envelope(envelope: &Envelope) -> StoreResult<Self> {
        if envelope.kind != Self::KIND {
            return Err(StoreError::KindMismatch {
                id: envelope.compute_id(),
                expected: Self::KIND,
                actual: envelope.kind,
            });
        }
        Self::deserialize(&envelope.payload)
    }
}

/// A decoded object of any kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// The kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Encode the payload.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.serialize(),
            Self::Tree(tree) => tree.serialize(),
            Self::Commit(commit) => commit.serialize(),
        }
    }

    /// Decode a payload according to `kind`.
    pub fn deserialize(kind: ObjectKind, payload: &[u8]) -> StoreResult<Self> {
        Ok(match kind {
            ObjectKind::Blob => Self::Blob(Blob::deserialize(payload)?),
            ObjectKind::Tree => Self::Tree(Tree::deserialize(payload)?),
            ObjectKind::Commit => Self::Commit(Commit::deserialize(payload)?),
        })
    }

    /// Wrap the serialized payload in an envelope.
    pub fn to_envelope(&self) -> Envelope {
        Envelope::new(self.kind(), self.serialize())
    }

    /// Decode from an envelope.
    pub fn from_envelope(envelope: &Envelope) -> StoreResult<Self> {
        Self::deserialize(envelope.kind, &envelope.payload)
    }

    /// Content-addressed identifier of this object.
    pub fn id(&self) -> ObjectId {
        ContentHasher::hash_object(self.kind(), &self.serialize())
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Tree> for Object {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}
