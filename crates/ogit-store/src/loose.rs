//! Loose object storage on the filesystem.
//!
//! On-disk layout:
//! ```text
//! <root>/
//!   ce/
//!     013625030ba8dba906f756967f9e9ca394464a   (zlib-compressed envelope)
//! ```
//!
//! The two-character shard directory is part of the format: any reader
//! locates objects the same way.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ogit_types::ObjectId;
use tracing::debug;

use crate::codec::{compress, decompress};
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Filesystem object store, one compressed file per object.
///
/// The root directory must already exist; the store only creates shard
/// directories beneath it. There is no cache: every read goes to disk.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    root: PathBuf,
}

impl LooseObjectStore {
    /// Open a store rooted at an existing `objects` directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `id`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.shard();
        self.root.join(dir).join(file)
    }

    fn ensure_shard_dir(&self, shard: &Path) -> StoreResult<()> {
        match fs::metadata(shard) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::Precondition {
                path: shard.to_path_buf(),
                reason: "shard path exists and is not a directory".into(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => match fs::create_dir(shard) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }
}

impl ObjectStore for LooseObjectStore {
    fn read_raw(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id));
            }
            Err(e) => return Err(e.into()),
        };
        debug!(object = %id.short_hex(), bytes = compressed.len(), "read loose object");
        decompress(&compressed)
    }

    fn write_raw(&self, id: &ObjectId, envelope: &[u8]) -> StoreResult<()> {
        let path = self.object_path(id);
        if path.is_file() {
            debug!(object = %id.short_hex(), "object already stored");
            return Ok(());
        }

        let shard = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        self.ensure_shard_dir(&shard)?;

        // Write to a temporary file in the shard, then rename into place so
        // a reader never sees a partial object.
        let compressed = compress(envelope)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&shard)?;
        tmp.write_all(&compressed)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(object = %id.short_hex(), bytes = compressed.len(), "wrote loose object");
        Ok(())
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}
