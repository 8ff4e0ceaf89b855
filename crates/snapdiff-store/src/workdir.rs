//! Lazy reads from a working directory.

use std::path::{Component, Path, PathBuf};

use snapdiff_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentSource;

/// Reads entry content from files under a root directory.
///
/// Paths are resolved relative to `root`. Symlinks are not followed: their
/// content is the link target. With verification on (the default), content
/// whose hash no longer matches the id recorded at scan time is rejected.
#[derive(Clone, Debug)]
pub struct WorkdirSource {
    root: PathBuf,
    verify: bool,
}

impl WorkdirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            verify: true,
        }
    }

    /// Skip hash verification on fetch.
    pub fn without_verification(mut self) -> Self {
        self.verify = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a snapshot path to a location under the root.
    pub fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn read_raw(&self, full: &Path) -> StoreResult<Vec<u8>> {
        let meta = std::fs::symlink_metadata(full).map_err(|e| StoreError::io(full, e))?;
        if meta.file_type().is_symlink() {
            read_link_target(full)
        } else {
            std::fs::read(full).map_err(|e| StoreError::io(full, e))
        }
    }
}

impl ContentSource for WorkdirSource {
    fn fetch(&self, path: &str, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let full = self.resolve(path)?;
        let data = self.read_raw(&full)?;
        debug!(path, bytes = data.len(), "read workdir content");

        if self.verify {
            let computed = ObjectId::for_content(&data);
            if computed != *id {
                return Err(StoreError::HashMismatch {
                    path: path.to_string(),
                    expected: *id,
                    computed,
                });
            }
        }
        Ok(data)
    }

    fn label(&self) -> String {
        format!("workdir({})", self.root.display())
    }
}

/// Read a symlink's target as raw bytes.
pub fn read_link_target(path: &Path) -> StoreResult<Vec<u8>> {
    let target = std::fs::read_link(path).map_err(|e| StoreError::io(path, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Ok(target.as_os_str().as_bytes().to_vec())
    }
    #[cfg(not(unix))]
    {
        Ok(target.to_string_lossy().replace('\\', "/").into_bytes())
    }
}
