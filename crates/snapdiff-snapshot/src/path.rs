//! Snapshot path rules.

use crate::error::{SnapshotError, SnapshotResult};

/// Check that `path` is a normalized, relative, forward-slash path.
pub fn validate_path(path: &str) -> SnapshotResult<()> {
    let reason = if path.is_empty() {
        Some("empty path")
    } else if path.starts_with('/') {
        Some("absolute path")
    } else if path.ends_with('/') {
        Some("trailing separator")
    } else if path.contains('\0') {
        Some("NUL byte in path")
    } else if path.split('/').any(str::is_empty) {
        Some("empty path component")
    } else if path.split('/').any(|c| c == "." || c == "..") {
        Some("relative path component")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SnapshotError::InvalidPath {
            path: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Every directory prefix of `path`, shortest first (`a/b/c` → `a`, `a/b`).
pub(crate) fn parent_dirs(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(i, _)| &path[..i])
}
