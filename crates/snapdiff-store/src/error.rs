use std::path::PathBuf;

use snapdiff_types::ObjectId;

/// Errors from content source operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(ObjectId),

    /// The content on disk no longer matches the identity recorded at scan time.
    #[error("content of {path} changed since it was scanned: expected {expected}, computed {computed}")]
    HashMismatch {
        path: String,
        expected: ObjectId,
        computed: ObjectId,
    },

    /// A path that cannot be resolved inside the source root.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// I/O error from the underlying filesystem.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for content source operations.
pub type StoreResult<T> = Result<T, StoreError>;
