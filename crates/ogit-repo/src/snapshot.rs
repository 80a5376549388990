//! Store a directory as blobs and trees.

use std::fs;
use std::path::Path;

use ogit_store::{Blob, EntryMode, ObjectStore, StoreResult, Tree, TreeEntry};
use ogit_types::ObjectId;
use tracing::debug;

use crate::repository::OGIT_DIR;

/// Write the contents of `dir` to `store` and return the root tree id.
///
/// Entries are ordered by file name bytes. The `.ogit` directory is
/// skipped, as is anything that is neither a regular file nor a directory.
pub fn write_tree_from_dir<S: ObjectStore>(store: &S, dir: &Path) -> StoreResult<ObjectId> {
    let mut children: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    children.sort_by_key(|entry| entry.file_name());

    let mut tree = Tree::empty();
    for child in children {
        let name = child.file_name();
        if name == OGIT_DIR {
            continue;
        }
        let path = child.path();
        let file_type = child.file_type()?;

        let (mode, id) = if file_type.is_dir() {
            (EntryMode::DIRECTORY, write_tree_from_dir(store, &path)?)
        } else if file_type.is_file() {
            let id = store.write_typed(&Blob::new(fs::read(&path)?))?;
            (file_mode(&child.metadata()?), id)
        } else {
            debug!(path = %path.display(), "skipping special file");
            continue;
        };

        tree.push(TreeEntry::new(mode, name_bytes(&name)?, id)?);
    }

    store.write_typed(&tree)
}

#[cfg(unix)]
fn file_mode(meta: &fs::Metadata) -> EntryMode {
    use std::os::unix::fs::PermissionsExt;
    if meta.permissions().mode() & 0o111 != 0 {
        EntryMode::EXECUTABLE
    } else {
        EntryMode::REGULAR
    }
}

#[cfg(not(unix))]
fn file_mode(_meta: &fs::Metadata) -> EntryMode {
    EntryMode::REGULAR
}

#[cfg(unix)]
fn name_bytes(name: &std::ffi::OsStr) -> StoreResult<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;
    Ok(name.as_bytes().to_vec())
}

#[cfg(not(unix))]
fn name_bytes(name: &std::ffi::OsStr) -> StoreResult<Vec<u8>> {
    name.to_str()
        .map(|s| s.as_bytes().to_vec())
        .ok_or_else(|| ogit_store::StoreError::format("file name", "not valid UTF-8"))
}
