use std::collections::HashMap;
use std::sync::RwLock;

use ogit_types::ObjectId;

use crate::codec::{compress, decompress};
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Envelopes are held compressed, exactly
/// as [`LooseObjectStore`](crate::LooseObjectStore) keeps them on disk.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Overwrite the stored bytes of `id` without any checks.
    ///
    /// Lets tests plant corrupt or adversarial objects under a chosen id.
    pub fn insert_raw(&self, id: ObjectId, envelope: &[u8]) -> StoreResult<()> {
        let compressed = compress(envelope)?;
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(id, compressed);
        Ok(())
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read_raw(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        let compressed = map.get(id).ok_or(StoreError::NotFound(*id))?;
        decompress(compressed)
    }

    fn write_raw(&self, id: &ObjectId, envelope: &[u8]) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        // Same id, same content: keep the first copy.
        if !map.contains_key(id) {
            map.insert(*id, compress(envelope)?);
        }
        Ok(())
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
