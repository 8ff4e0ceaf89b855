//! Error types for the snapshot crate.

/// Errors that can occur while building or validating snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The same path appears more than once.
    #[error("duplicate path in snapshot: {0}")]
    DuplicatePath(String),

    /// A path is used both as a file and as a directory.
    #[error("path {file} is a file but {nested} treats it as a directory")]
    PathCollision { file: String, nested: String },

    /// A path is empty, absolute, or not normalized.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The path is not tracked by the snapshot or builder.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// Reading content for the snapshot failed.
    #[error("store error: {0}")]
    Store(#[from] snapdiff_store::StoreError),

    /// Walking the working directory failed.
    #[error("walk error: {0}")]
    Walk(String),
}

/// Convenience alias for snapshot results.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
