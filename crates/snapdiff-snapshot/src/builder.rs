//! Build snapshots by staging content into a blob store.
//!
//! [`SnapshotBuilder`] plays the role of a staging area plus commit: content
//! is written into an [`InMemoryBlobStore`] as it is added, and
//! [`SnapshotBuilder::build`] freezes the staged entries into a [`Snapshot`]
//! whose entries read back from that store.

use std::collections::BTreeMap;
use std::sync::Arc;

use snapdiff_store::{ContentSource, InMemoryBlobStore};
use snapdiff_types::{EntryMode, ObjectId};
use tracing::debug;

use crate::entry::Entry;
use crate::error::{SnapshotError, SnapshotResult};
use crate::path::validate_path;
use crate::snapshot::Snapshot;

/// Stages files into a blob store and builds snapshots from them.
pub struct SnapshotBuilder {
    store: Arc<InMemoryBlobStore>,
    staged: BTreeMap<String, (EntryMode, ObjectId)>,
}

impl std::fmt::Debug for SnapshotBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotBuilder")
            .field("staged", &self.staged.len())
            .field("store", &self.store)
            .finish()
    }
}

impl SnapshotBuilder {
    /// Create a builder backed by `store`.
    pub fn new(store: Arc<InMemoryBlobStore>) -> Self {
        Self {
            store,
            staged: BTreeMap::new(),
        }
    }

    /// Start from the entries of an existing snapshot.
    ///
    /// Content of the seed entries is copied into this builder's store so the
    /// resulting snapshot does not depend on the seed's source.
    pub fn from_snapshot(store: Arc<InMemoryBlobStore>, seed: &Snapshot) -> SnapshotResult<Self> {
        let mut builder = Self::new(store);
        for entry in seed {
            let content = entry.content()?;
            builder.add_file(entry.path(), &content, entry.mode())?;
        }
        Ok(builder)
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<InMemoryBlobStore> {
        &self.store
    }

    /// Stage a file, replacing any previously staged content at `path`.
    pub fn add_file(&mut self, path: &str, content: &[u8], mode: EntryMode) -> SnapshotResult<ObjectId> {
        validate_path(path)?;
        let id = self.store.write_blob(content);
        debug!(path, id = %id.short_hex(), bytes = content.len(), "staged file");
        self.staged.insert(path.to_string(), (mode, id));
        Ok(id)
    }

    /// Stage a symlink pointing at `target`.
    pub fn add_symlink(&mut self, path: &str, target: &str) -> SnapshotResult<ObjectId> {
        self.add_file(path, target.as_bytes(), EntryMode::Symlink)
    }

    /// Change the mode of a staged path without touching its content.
    pub fn set_mode(&mut self, path: &str, mode: EntryMode) -> SnapshotResult<()> {
        let staged = self
            .staged
            .get_mut(path)
            .ok_or_else(|| SnapshotError::PathNotFound(path.to_string()))?;
        staged.0 = mode;
        Ok(())
    }

    /// Unstage a path.
    pub fn remove(&mut self, path: &str) -> SnapshotResult<()> {
        self.staged
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| SnapshotError::PathNotFound(path.to_string()))
    }

    /// Number of staged paths.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Freeze the staged entries into a validated snapshot.
    pub fn build(&self) -> SnapshotResult<Snapshot> {
        let source: Arc<dyn ContentSource> = self.store.clone();
        let entries = self
            .staged
            .iter()
            .map(|(path, (mode, id))| Entry::new(path.clone(), *mode, *id, Arc::clone(&source)))
            .collect();
        Snapshot::try_new(entries)
    }
}
