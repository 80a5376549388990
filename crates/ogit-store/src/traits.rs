use ogit_types::ObjectId;

use crate::codec::Envelope;
use crate::error::StoreResult;
use crate::object::{Blob, Commit, Object, ObjectPayload, Tree};

/// Content-addressed object store.
///
/// Implementations persist envelope bytes under their identifier and hand
/// them back unchanged. All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same identifier always maps to
///   the same envelope, so writing an existing identifier is a no-op.
/// - Reading an absent identifier is [`StoreError::NotFound`].
/// - The store never interprets envelope contents; decoding happens in the
///   provided methods on top of [`read_raw`](ObjectStore::read_raw).
///
/// [`StoreError::NotFound`]: crate::StoreError::NotFound
pub trait ObjectStore: Send + Sync {
    /// Read the uncompressed envelope bytes stored under `id`.
    fn read_raw(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Persist envelope bytes under `id`. Idempotent.
    fn write_raw(&self, id: &ObjectId, envelope: &[u8]) -> StoreResult<()>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read and decode the envelope stored under `id`.
    fn read(&self, id: &ObjectId) -> StoreResult<Envelope> {
        Envelope::decode(&self.read_raw(id)?)
    }

    /// Encode and persist an envelope, returning its identifier.
    fn write(&self, envelope: &Envelope) -> StoreResult<ObjectId> {
        let (id, bytes) = Envelope::encode(envelope.kind, &envelope.payload);
        self.write_raw(&id, &bytes)?;
        Ok(id)
    }

    /// Read an object of any kind.
    fn read_object(&self, id: &ObjectId) -> StoreResult<Object> {
        Object::from_envelope(&self.read(id)?)
    }

    /// Persist an object of any kind.
    fn write_object(&self, object: &Object) -> StoreResult<ObjectId> {
        self.write(&object.to_envelope())
    }

    /// Read an object that must be of kind `T`.
    fn read_typed<T: ObjectPayload>(&self, id: &ObjectId) -> StoreResult<T>
    where
        Self: Sized,
    {
        T::from_envelope(&self.read(id)?)
    }

    /// Persist a typed object.
    fn write_typed<T: ObjectPayload>(&self, object: &T) -> StoreResult<ObjectId>
    where
        Self: Sized,
    {
        self.write(&object.to_envelope())
    }

    /// Read a blob.
    fn read_blob(&self, id: &ObjectId) -> StoreResult<Blob>
    where
        Self: Sized,
    {
        self.read_typed(id)
    }

    /// Read a tree.
    fn read_tree(&self, id: &ObjectId) -> StoreResult<Tree>
    where
        Self: Sized,
    {
        self.read_typed(id)
    }

    /// Read a commit.
    fn read_commit(&self, id: &ObjectId) -> StoreResult<Commit>
    where
        Self: Sized,
    {
        self.read_typed(id)
    }
}
