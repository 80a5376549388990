//! Tree objects and the tree entry codec.
//!
//! Payload format, repeated until the payload is exhausted:
//! ```text
//! <mode: 5 or 6 octal digits> SP <name> NUL <20-byte raw object id>
//! ```
//!
//! Entries are kept in the order they were given. Nothing here sorts them,
//! so a tree built by another tool round-trips byte-for-byte, and a tree
//! built here hashes according to its caller's ordering.

use std::fmt;

use ogit_types::object::OBJECT_ID_LEN;
use ogit_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::object::ObjectPayload;

/// File mode of a tree entry, kept as the exact octal digits it was
/// written with (`40000` and `040000` are distinct encodings).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryMode {
    digits: [u8; 6],
    width: u8,
}

impl EntryMode {
    /// Normal file.
    pub const REGULAR: Self = Self {
        digits: *b"100644",
        width: 6,
    };
    /// Executable file.
    pub const EXECUTABLE: Self = Self {
        digits: *b"100755",
        width: 6,
    };
    /// Symbolic link.
    pub const SYMLINK: Self = Self {
        digits: *b"120000",
        width: 6,
    };
    /// Subtree, in the 5-digit form git writes.
    pub const DIRECTORY: Self = Self {
        digits: *b"40000\0",
        width: 5,
    };

    /// Parse a mode field. Only 5 or 6 octal digits are accepted.
    pub fn parse(field: &[u8]) -> StoreResult<Self> {
        if field.len() != 5 && field.len() != 6 {
            return Err(StoreError::format(
                "tree entry",
                format!("mode must be 5 or 6 digits, got {}", field.len()),
            ));
        }
        if !field.iter().all(|b| (b'0'..=b'7').contains(b)) {
            return Err(StoreError::format(
                "tree entry",
                format!("mode {:?} is not octal", String::from_utf8_lossy(field)),
            ));
        }
        let mut digits = [0u8; 6];
        digits[..field.len()].copy_from_slice(field);
        Ok(Self {
            digits,
            width: field.len() as u8,
        })
    }

    /// The mode digits as written.
    pub fn as_bytes(&self) -> &[u8] {
        &self.digits[..self.width as usize]
    }

    /// Numeric value of the octal digits.
    pub fn bits(&self) -> u32 {
        self.as_bytes()
            .iter()
            .fold(0, |acc, d| (acc << 3) | u32::from(d - b'0'))
    }

    /// Returns `true` if the mode denotes a subtree.
    pub fn is_tree(&self) -> bool {
        self.bits() & 0o170000 == 0o040000
    }

    /// Returns `true` for executable regular files.
    pub fn is_executable(&self) -> bool {
        self.bits() == 0o100755
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &d in self.as_bytes() {
            write!(f, "{}", d as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryMode({self})")
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File mode.
    pub mode: EntryMode,
    name: Vec<u8>,
    /// Identifier of the referenced blob or tree.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    ///
    /// The name must be non-empty and free of NUL bytes, otherwise the entry
    /// could not be read back from a serialized tree.
    pub fn new(mode: EntryMode, name: impl Into<Vec<u8>>, id: ObjectId) -> StoreResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::format("tree entry", "empty name"));
        }
        if name.contains(&0) {
            return Err(StoreError::format(
                "tree entry",
                format!("name {:?} contains NUL", String::from_utf8_lossy(&name)),
            ));
        }
        Ok(Self { mode, name, id })
    }

    /// Entry name bytes.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// The entry name for display, with invalid UTF-8 replaced.
    pub fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// Directory listing object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    /// Entries in stored order.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree with the given entries, in the given order.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: TreeEntry) {
        self.entries.push(entry);
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &[u8]) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Iterate over entries in stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a TreeEntry;
    type IntoIter = std::slice::Iter<'a, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl ObjectPayload for Tree {
    const KIND: ObjectKind = ObjectKind::Tree;

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.id.as_bytes());
        }
        out
    }

    fn deserialize(payload: &[u8]) -> StoreResult<Self> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < payload.len() {
            let space = find(payload, pos, b' ')
                .ok_or_else(|| StoreError::format("tree entry", "missing space after mode"))?;
            let mode = EntryMode::parse(&payload[pos..space])?;

            let nul = find(payload, space + 1, 0)
                .ok_or_else(|| StoreError::format("tree entry", "missing NUL after name"))?;
            let name = &payload[space + 1..nul];

            let id_start = nul + 1;
            let id_end = id_start + OBJECT_ID_LEN;
            if id_end > payload.len() {
                return Err(StoreError::format(
                    "tree entry",
                    format!("truncated object id for {:?}", String::from_utf8_lossy(name)),
                ));
            }
            let id = ObjectId::from_slice(&payload[id_start..id_end])
                .map_err(|e| StoreError::format("tree entry", e.to_string()))?;

            entries.push(TreeEntry::new(mode, name, id)?);
            pos = id_end;
        }

        Ok(Self { entries })
    }
}

fn find(haystack: &[u8], from: usize, needle: u8) -> Option<usize> {
    haystack[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectStore;
    use proptest::prelude::*;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 20])
    }

    #[test]
    fn serialize_layout() {
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::REGULAR, "a.txt", oid(0xab)).unwrap()]);
        let mut expected = b"100644 a.txt\0".to_vec();
        expected.extend_from_slice(&[0xab; 20]);
        assert_eq!(tree.serialize(), expected);
    }

    #[test]
    fn entry_order_is_preserved() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::REGULAR, "zebra.txt", oid(1)).unwrap(),
            TreeEntry::new(EntryMode::REGULAR, "alpha.txt", oid(2)).unwrap(),
            TreeEntry::new(EntryMode::DIRECTORY, "middle", oid(3)).unwrap(),
        ]);
        let decoded = Tree::deserialize(&tree.serialize()).unwrap();
        assert_eq!(decoded, tree);
        assert_eq!(decoded.entries[0].name(), b"zebra.txt");
        assert_eq!(decoded.entries[2].name(), b"middle");
    }

    #[test]
    fn five_digit_directory_mode_roundtrips() {
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::DIRECTORY, "sub", oid(9)).unwrap()]);
        let bytes = tree.serialize();
        assert!(bytes.starts_with(b"40000 sub\0"));
        let decoded = Tree::deserialize(&bytes).unwrap();
        assert_eq!(decoded.entries[0].mode.as_bytes(), b"40000");
        assert!(decoded.entries[0].mode.is_tree());
    }

    #[test]
    fn six_digit_directory_mode_is_distinct() {
        let mode = EntryMode::parse(b"040000").unwrap();
        assert!(mode.is_tree());
        assert_ne!(mode, EntryMode::DIRECTORY);
        assert_eq!(mode.bits(), EntryMode::DIRECTORY.bits());
    }

    #[test]
    fn mode_predicates() {
        assert!(EntryMode::EXECUTABLE.is_executable());
        assert!(!EntryMode::REGULAR.is_executable());
        assert!(!EntryMode::SYMLINK.is_tree());
        assert_eq!(EntryMode::REGULAR.to_string(), "100644");
        assert_eq!(EntryMode::REGULAR.bits(), 0o100644);
    }

    #[test]
    fn rejects_bad_mode_width() {
        let mut bytes = b"1006440 a\0".to_vec();
        bytes.extend_from_slice(&[0; 20]);
        assert!(Tree::deserialize(&bytes).unwrap_err().is_format());

        let mut bytes = b"1006 a\0".to_vec();
        bytes.extend_from_slice(&[0; 20]);
        assert!(Tree::deserialize(&bytes).unwrap_err().is_format());
    }

    #[test]
    fn rejects_non_octal_mode() {
        let mut bytes = b"100648 a\0".to_vec();
        bytes.extend_from_slice(&[0; 20]);
        assert!(Tree::deserialize(&bytes).unwrap_err().is_format());
    }

    #[test]
    fn rejects_missing_nul() {
        assert!(Tree::deserialize(b"100644 a.txt").unwrap_err().is_format());
    }

    #[test]
    fn rejects_missing_space() {
        assert!(Tree::deserialize(b"100644").unwrap_err().is_format());
    }

    #[test]
    fn rejects_truncated_id() {
        let mut bytes = b"100644 a\0".to_vec();
        bytes.extend_from_slice(&[0; 19]);
        assert!(Tree::deserialize(&bytes).unwrap_err().is_format());
    }

    #[test]
    fn rejects_empty_name_on_decode() {
        let mut bytes = b"100644 \0".to_vec();
        bytes.extend_from_slice(&[0; 20]);
        assert!(Tree::deserialize(&bytes).unwrap_err().is_format());
    }

    #[test]
    fn entry_rejects_empty_name() {
        let err = TreeEntry::new(EntryMode::REGULAR, "", oid(1)).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn entry_rejects_nul_in_name() {
        let err = TreeEntry::new(EntryMode::REGULAR, b"a\0b".to_vec(), oid(1)).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn every_constructible_tree_reads_back() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::REGULAR, "x", oid(1)).unwrap(),
            TreeEntry::new(EntryMode::DIRECTORY, vec![0x01u8], oid(2)).unwrap(),
        ]);
        let store = crate::InMemoryObjectStore::new();
        let id = store.write_typed(&tree).unwrap();
        assert_eq!(store.read_tree(&id).unwrap(), tree);
    }

    #[test]
    fn empty_payload_is_empty_tree() {
        assert!(Tree::deserialize(b"").unwrap().is_empty());
    }

    #[test]
    fn name_may_contain_spaces_and_non_utf8() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::REGULAR, "with space", oid(1)).unwrap(),
            TreeEntry::new(EntryMode::REGULAR, vec![0xffu8, 0xfe], oid(2)).unwrap(),
        ]);
        assert_eq!(Tree::deserialize(&tree.serialize()).unwrap(), tree);
    }

    #[test]
    fn get_entry() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::REGULAR, "a.txt", oid(1)).unwrap(),
            TreeEntry::new(EntryMode::REGULAR, "b.txt", oid(2)).unwrap(),
        ]);
        assert_eq!(tree.get(b"b.txt").map(|e| e.id), Some(oid(2)));
        assert!(tree.get(b"missing").is_none());
        assert_eq!(tree.len(), 2);
    }

    fn entry_strategy() -> impl Strategy<Value = TreeEntry> {
        let mode = prop_oneof![
            Just(EntryMode::REGULAR),
            Just(EntryMode::EXECUTABLE),
            Just(EntryMode::SYMLINK),
            Just(EntryMode::DIRECTORY),
        ];
        let name = proptest::collection::vec(1u8..=255, 1..24);
        let id = proptest::array::uniform20(any::<u8>()).prop_map(ObjectId::from_hash);
        (mode, name, id).prop_map(|(mode, name, id)| TreeEntry::new(mode, name, id).unwrap())
    }

    proptest! {
        #[test]
        fn tree_roundtrip_preserves_order(
            entries in proptest::collection::vec(entry_strategy(), 0..16),
        ) {
            let tree = Tree::new(entries);
            prop_assert_eq!(Tree::deserialize(&tree.serialize()).unwrap(), tree);
        }
    }
}
