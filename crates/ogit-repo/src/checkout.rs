//! Tree materialization.
//!
//! Writes a stored tree onto the filesystem: subtrees become directories,
//! blobs become files. Entries are processed in stored order and subtrees
//! are completed before the next sibling, using an explicit stack.
//!
//! Entry names are used as-is. There is no defense against `..`, absolute
//! names, or collisions with existing files, and no rollback: a failure
//! leaves whatever was written so far.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use ogit_store::{Object, ObjectStore, StoreError, StoreResult, Tree};
use ogit_types::ObjectKind;
use tracing::{debug, info};

/// Materialize `tree` into `destination`, which must be an empty directory
/// or not exist yet (it is then created).
pub fn checkout<S: ObjectStore>(store: &S, tree: &Tree, destination: &Path) -> StoreResult<()> {
    if destination.exists() {
        if !destination.is_dir() {
            return Err(StoreError::Precondition {
                path: destination.to_path_buf(),
                reason: "destination is not a directory".into(),
            });
        }
        if fs::read_dir(destination)?.next().is_some() {
            return Err(StoreError::Precondition {
                path: destination.to_path_buf(),
                reason: "destination directory is not empty".into(),
            });
        }
    } else {
        fs::create_dir_all(destination)?;
    }

    materialize(store, tree, destination)?;
    info!(destination = %destination.display(), "checked out tree");
    Ok(())
}

struct Frame {
    tree: Tree,
    dir: PathBuf,
    next: usize,
}

/// Write every entry of `tree` under `destination`, descending into
/// subtrees. `destination` must already exist.
pub fn materialize<S: ObjectStore>(
    store: &S,
    tree: &Tree,
    destination: &Path,
) -> StoreResult<()> {
    let mut stack = vec![Frame {
        tree: tree.clone(),
        dir: destination.to_path_buf(),
        next: 0,
    }];

    while let Some(top) = stack.last_mut() {
        let Some(entry) = top.tree.entries.get(top.next) else {
            stack.pop();
            continue;
        };
        top.next += 1;
        let path = top.dir.join(path_component(entry.name())?);

        match store.read_object(&entry.id)? {
            Object::Tree(subtree) => {
                fs::create_dir(&path)?;
                debug!(path = %path.display(), "created directory");
                stack.push(Frame {
                    tree: subtree,
                    dir: path,
                    next: 0,
                });
            }
            Object::Blob(blob) => {
                fs::write(&path, &blob.data)?;
                if entry.mode.is_executable() {
                    mark_executable(&path)?;
                }
                debug!(path = %path.display(), bytes = blob.len(), "wrote file");
            }
            Object::Commit(_) => {
                return Err(StoreError::KindMismatch {
                    id: entry.id,
                    expected: ObjectKind::Blob,
                    actual: ObjectKind::Commit,
                });
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> StoreResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> StoreResult<()> {
    Ok(())
}

#[cfg(unix)]
fn path_component(name: &[u8]) -> StoreResult<OsString> {
    use std::os::unix::ffi::OsStrExt;
    Ok(std::ffi::OsStr::from_bytes(name).to_os_string())
}

#[cfg(not(unix))]
fn path_component(name: &[u8]) -> StoreResult<OsString> {
    std::str::from_utf8(name)
        .map(OsString::from)
        .map_err(|_| StoreError::format("tree entry", "name is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogit_store::{Blob, Commit, EntryMode, InMemoryObjectStore, ObjectPayload, TreeEntry};

    fn blob(store: &InMemoryObjectStore, data: &[u8]) -> ogit_types::ObjectId {
        store.write_typed(&Blob::new(data.to_vec())).unwrap()
    }

    #[test]
    fn single_file() {
        let store = InMemoryObjectStore::new();
        let id = blob(&store, b"hello\n");
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::REGULAR, "a.txt", id).unwrap()]);

        let dir = tempfile::tempdir().unwrap();
        materialize(&store, &tree, dir.path()).unwrap();
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"hello\n");
    }

    #[test]
    fn nested_structure() {
        let store = InMemoryObjectStore::new();
        let readme = blob(&store, b"# readme\n");
        let main = blob(&store, b"fn main() {}\n");
        let empty = blob(&store, b"");

        let deep = Tree::new(vec![TreeEntry::new(EntryMode::REGULAR, "empty", empty).unwrap()]);
        let deep_id = store.write_typed(&deep).unwrap();
        let src = Tree::new(vec![
            TreeEntry::new(EntryMode::REGULAR, "main.rs", main).unwrap(),
            TreeEntry::new(EntryMode::DIRECTORY, "deep", deep_id).unwrap(),
        ]);
        let src_id = store.write_typed(&src).unwrap();
        let root = Tree::new(vec![
            TreeEntry::new(EntryMode::DIRECTORY, "src", src_id).unwrap(),
            TreeEntry::new(EntryMode::REGULAR, "README.md", readme).unwrap(),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        checkout(&store, &root, &out).unwrap();

        assert_eq!(fs::read(out.join("README.md")).unwrap(), b"# readme\n");
        assert_eq!(fs::read(out.join("src/main.rs")).unwrap(), b"fn main() {}\n");
        assert_eq!(fs::read(out.join("src/deep/empty")).unwrap(), b"");
    }

    #[test]
    fn refuses_non_empty_destination() {
        let store = InMemoryObjectStore::new();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("existing"), b"x").unwrap();
        let err = checkout(&store, &Tree::empty(), dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Precondition { .. }));
    }

    #[test]
    fn refuses_file_destination() {
        let store = InMemoryObjectStore::new();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();
        let err = checkout(&store, &Tree::empty(), &file).unwrap_err();
        assert!(matches!(err, StoreError::Precondition { .. }));
    }

    #[test]
    fn missing_blob_fails_after_partial_write() {
        let store = InMemoryObjectStore::new();
        let present = blob(&store, b"present");
        let missing = Blob::new(b"never stored".to_vec()).id();
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::REGULAR, "first", present).unwrap(),
            TreeEntry::new(EntryMode::REGULAR, "second", missing).unwrap(),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let err = materialize(&store, &tree, dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == missing));
        assert!(dir.path().join("first").is_file());
        assert!(!dir.path().join("second").exists());
    }

    #[test]
    fn commit_entry_is_rejected() {
        let store = InMemoryObjectStore::new();
        let commit = Commit::builder(Tree::empty().id()).build("m").unwrap();
        let commit_id = store.write_typed(&commit).unwrap();
        let entry =
            TreeEntry::new(EntryMode::parse(b"160000").unwrap(), "submodule", commit_id).unwrap();
        let tree = Tree::new(vec![entry]);
        let dir = tempfile::tempdir().unwrap();
        assert!(materialize(&store, &tree, dir.path()).unwrap_err().is_format());
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let store = InMemoryObjectStore::new();
        let id = blob(&store, b"#!/bin/sh\n");
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::EXECUTABLE, "run.sh", id).unwrap()]);
        let dir = tempfile::tempdir().unwrap();
        materialize(&store, &tree, dir.path()).unwrap();
        let mode = fs::metadata(dir.path().join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
