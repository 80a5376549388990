use crate::error::StoreResult;
use crate::object::ObjectPayload;
use ogit_types::ObjectKind;

/// Raw content object. The payload is the content, untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the blob has no content.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ObjectPayload for Blob {
    const KIND: ObjectKind = ObjectKind::Blob;

    fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn deserialize(payload: &[u8]) -> StoreResult<Self> {
        Ok(Self::new(payload.to_vec()))
    }
}
