//! Content-addressed object storage for OGit.
//!
//! This crate implements a hash-keyed object store laid out like git's
//! `.git/objects/` directory. Every object (blob, tree, commit) is stored as
//! a zlib-compressed envelope `<kind> <len>\0<payload>` under the SHA-1 of
//! the uncompressed envelope.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- ordered directory listing of `(mode, name, id)` entries
//! - [`Commit`] -- header block plus free-text message, encoded as [`Kvlm`]
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one compressed file per object, sharded by the
//!   first two hex characters of the identifier
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Only the uncompressed envelope is hashed; compression is a storage detail.
//! 3. A declared envelope length that disagrees with the payload is corruption.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use codec::{compress, decompress, Envelope};
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{
    Blob, Commit, CommitBuilder, EntryMode, Kvlm, Object, ObjectPayload, Tree, TreeEntry,
};
pub use traits::ObjectStore;
