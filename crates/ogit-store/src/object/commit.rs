use ogit_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::object::kvlm::Kvlm;
use crate::object::ObjectPayload;

/// Commit object: a [`Kvlm`] header block and message.
///
/// The mapping is the commit's full state. Well-known headers (`tree`,
/// `parent`, `author`, `committer`) have typed accessors; any other header
/// is preserved as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    pub kvlm: Kvlm,
}

impl Commit {
    /// Wrap an existing header mapping.
    pub fn from_kvlm(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    /// Start building a commit that points at `tree`.
    pub fn builder(tree: ObjectId) -> CommitBuilder {
        CommitBuilder::new(tree)
    }

    /// The root tree of this commit.
    pub fn tree(&self) -> StoreResult<ObjectId> {
        let value = self
            .kvlm
            .first(b"tree")
            .ok_or_else(|| StoreError::format("commit", "missing tree header"))?;
        parse_id(value)
    }

    /// Parent commits in header order. Empty for a root commit.
    pub fn parents(&self) -> StoreResult<Vec<ObjectId>> {
        self.kvlm
            .get(b"parent")
            .unwrap_or_default()
            .iter()
            .map(|value| parse_id(value))
            .collect()
    }

    /// All values of header `key`, in order.
    pub fn get(&self, key: &[u8]) -> Option<&[Vec<u8>]> {
        self.kvlm.get(key)
    }

    /// The raw `author` header.
    pub fn author(&self) -> Option<&[u8]> {
        self.kvlm.first(b"author")
    }

    /// The raw `committer` header.
    pub fn committer(&self) -> Option<&[u8]> {
        self.kvlm.first(b"committer")
    }

    /// The commit message.
    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}

impl ObjectPayload for Commit {
    const KIND: ObjectKind = ObjectKind::Commit;

    fn serialize(&self) -> Vec<u8> {
        self.kvlm.encode()
    }

    fn deserialize(payload: &[u8]) -> StoreResult<Self> {
        Ok(Self {
            kvlm: Kvlm::decode(payload)?,
        })
    }
}

fn parse_id(value: &[u8]) -> StoreResult<ObjectId> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| ObjectId::from_hex(s).ok())
        .ok_or_else(|| {
            StoreError::format(
                "commit",
                format!("{:?} is not an object id", String::from_utf8_lossy(value)),
            )
        })
}

/// Assembles a commit header block in the conventional order:
/// `tree`, `parent`*, `author`, `committer`, then any extra headers.
#[derive(Clone, Debug)]
pub struct CommitBuilder {
    tree: ObjectId,
    parents: Vec<ObjectId>,
    author: Option<Vec<u8>>,
    committer: Option<Vec<u8>>,
    extra: Vec<(Vec<u8>, Vec<u8>)>,
}

impl CommitBuilder {
    /// Start a commit pointing at `tree`.
    pub fn new(tree: ObjectId) -> Self {
        Self {
            tree,
            parents: Vec::new(),
            author: None,
            committer: None,
            extra: Vec::new(),
        }
    }

    /// Add a parent commit.
    pub fn parent(mut self, parent: ObjectId) -> Self {
        self.parents.push(parent);
        self
    }

    /// Set the `author` header (`Name <email> <epoch> <tz>`).
    pub fn author(mut self, author: impl Into<Vec<u8>>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the `committer` header. Defaults to the author when unset.
    pub fn committer(mut self, committer: impl Into<Vec<u8>>) -> Self {
        self.committer = Some(committer.into());
        self
    }

    /// Append an arbitrary header after the standard ones.
    pub fn header(mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Finish the commit with `message`.
    pub fn build(self, message: impl Into<Vec<u8>>) -> StoreResult<Commit> {
        let mut kvlm = Kvlm::with_message(message);
        kvlm.push("tree", self.tree.to_hex())?;
        for parent in &self.parents {
            kvlm.push("parent", parent.to_hex())?;
        }
        let committer = self.committer.or_else(|| self.author.clone());
        if let Some(author) = self.author {
            kvlm.push("author", author)?;
        }
        if let Some(committer) = committer {
            kvlm.push("committer", committer)?;
        }
        for (key, value) in self.extra {
            kvlm.push(key, value)?;
        }
        Ok(Commit { kvlm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 20])
    }

    #[test]
    fn builder_layout() {
        let commit = Commit::builder(oid(1))
            .parent(oid(2))
            .parent(oid(3))
            .author("A U Thor <author@example.com> 1700000000 +0000")
            .build("Merge\n")
            .unwrap();
        let text = String::from_utf8(commit.serialize()).unwrap();
        let expected = format!(
            "tree {}\nparent {}\nparent {}\nauthor A U Thor <author@example.com> 1700000000 +0000\ncommitter A U Thor <author@example.com> 1700000000 +0000\n\nMerge\n",
            oid(1),
            oid(2),
            oid(3)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn accessors() {
        let commit = Commit::builder(oid(1))
            .parent(oid(2))
            .author("me")
            .committer("you")
            .header("encoding", "UTF-8")
            .build("msg")
            .unwrap();
        assert_eq!(commit.tree().unwrap(), oid(1));
        assert_eq!(commit.parents().unwrap(), vec![oid(2)]);
        assert_eq!(commit.author(), Some(b"me".as_slice()));
        assert_eq!(commit.committer(), Some(b"you".as_slice()));
        assert_eq!(commit.kvlm.first(b"encoding"), Some(b"UTF-8".as_slice()));
        assert_eq!(commit.message(), b"msg");
    }

    #[test]
    fn root_commit_has_no_parents() {
        let commit = Commit::builder(oid(1)).build("root").unwrap();
        assert!(commit.parents().unwrap().is_empty());
    }

    #[test]
    fn roundtrip_through_payload() {
        let commit = Commit::builder(oid(4)).parent(oid(5)).build("x\ny\n").unwrap();
        let decoded = Commit::deserialize(&commit.serialize()).unwrap();
        assert_eq!(decoded, commit);
    }

    #[test]
    fn malformed_parent_is_format_error() {
        let commit = Commit::deserialize(b"tree 00\nparent nothex\n\nm").unwrap();
        assert!(commit.tree().unwrap_err().is_format());
        assert!(commit.parents().unwrap_err().is_format());
    }

    #[test]
    fn missing_tree_is_format_error() {
        let commit = Commit::deserialize(b"\nno headers").unwrap();
        assert!(commit.tree().unwrap_err().is_format());
    }

    #[test]
    fn builder_rejects_bad_extra_header() {
        let result = Commit::builder(oid(1)).header("bad key", "v").build("m");
        assert!(result.is_err());
    }
}
