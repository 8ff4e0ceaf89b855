//! Working-tree capture.
//!
//! Walks a directory and records every regular file and symlink as an entry.
//! Content is hashed during the walk and then dropped: the resulting entries
//! re-read it lazily from disk through a [`WorkdirSource`].

use std::path::{Component, Path};
use std::sync::Arc;

use ignore::WalkBuilder;
use snapdiff_store::{read_link_target, ContentSource, StoreError, WorkdirSource};
use snapdiff_types::{EntryMode, ObjectId};
use tracing::{debug, info};

use crate::entry::Entry;
use crate::error::{SnapshotError, SnapshotResult};
use crate::snapshot::Snapshot;

/// Options for [`scan_workdir`].
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Honour `.gitignore`, `.ignore` and `.git/info/exclude` files.
    pub respect_ignore_files: bool,
    /// Include dot-files and dot-directories.
    pub include_hidden: bool,
    /// Directory names that are never descended into.
    pub skip_dirs: Vec<String>,
    /// Verify content hashes when entries are read back.
    pub verify_on_read: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            respect_ignore_files: true,
            include_hidden: true,
            skip_dirs: vec![".git".into(), ".snapdiff".into()],
            verify_on_read: true,
        }
    }
}

/// Capture the working directory at `root` as a snapshot.
pub fn scan_workdir(root: &Path, options: &ScanOptions) -> SnapshotResult<Snapshot> {
    let mut source = WorkdirSource::new(root);
    if !options.verify_on_read {
        source = source.without_verification();
    }
    let source: Arc<dyn ContentSource> = Arc::new(source);

    let skip_dirs = options.skip_dirs.clone();
    let walker = WalkBuilder::new(root)
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_ignore_files)
        .git_exclude(options.respect_ignore_files)
        .ignore(options.respect_ignore_files)
        .git_global(false)
        .parents(false)
        .require_git(false)
        .follow_links(false)
        .filter_entry(move |dent| {
            let is_dir = dent.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && skip_dirs.iter().any(|s| dent.file_name() == s.as_str()))
        })
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let dent = result.map_err(|e| SnapshotError::Walk(e.to_string()))?;
        let Some(file_type) = dent.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            continue;
        }

        let full = dent.path();
        let path = relative_path(root, full)?;

        let (mode, content) = if file_type.is_symlink() {
            (EntryMode::Symlink, read_link_target(full)?)
        } else if file_type.is_file() {
            let content = std::fs::read(full).map_err(|e| StoreError::Io {
                path: full.to_path_buf(),
                source: e,
            })?;
            (file_mode(full)?, content)
        } else {
            debug!(path = %full.display(), "skipping special file");
            continue;
        };

        let id = ObjectId::for_content(&content);
        debug!(path = %path, %mode, id = %id.short_hex(), "scanned");
        entries.push(Entry::new(path, mode, id, Arc::clone(&source)));
    }

    let snapshot = Snapshot::try_new(entries)?;
    info!(root = %root.display(), entries = snapshot.len(), "working tree scanned");
    Ok(snapshot)
}

/// Convert a path under `root` to a forward-slash snapshot path.
fn relative_path(root: &Path, full: &Path) -> SnapshotResult<String> {
    let invalid = |reason| SnapshotError::InvalidPath {
        path: full.display().to_string(),
        reason,
    };
    let rel = full
        .strip_prefix(root)
        .map_err(|_| invalid("outside scan root"))?;

    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| invalid("non UTF-8 path"))?),
            _ => return Err(invalid("unexpected path component")),
        }
    }
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn file_mode(path: &Path) -> SnapshotResult<EntryMode> {
    use std::os::unix::fs::PermissionsExt;

    let meta = std::fs::metadata(path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if meta.permissions().mode() & 0o111 != 0 {
        Ok(EntryMode::Executable)
    } else {
        Ok(EntryMode::Regular)
    }
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> SnapshotResult<EntryMode> {
    Ok(EntryMode::Regular)
}
