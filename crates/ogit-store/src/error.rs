use std::path::PathBuf;

use ogit_types::{ObjectId, ObjectKind};

/// Errors from object store and codec operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// Malformed envelope, tree entry or commit payload.
    #[error("malformed {context}: {reason}")]
    Format {
        context: &'static str,
        reason: String,
    },

    /// An object was found but is not of the expected kind.
    #[error("object {id} is a {actual}, expected a {expected}")]
    KindMismatch {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// The filesystem is not in the state an operation requires.
    #[error("precondition failed for {}: {reason}", path.display())]
    Precondition { path: PathBuf, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Build a [`StoreError::Format`].
    pub fn format(context: &'static str, reason: impl Into<String>) -> Self {
        Self::Format {
            context,
            reason: reason.into(),
        }
    }

    /// Returns `true` for corruption-class errors (malformed bytes or an
    /// unexpected object kind).
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::KindMismatch { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
