//! The immutable snapshot type.

use std::collections::HashSet;

use crate::entry::Entry;
use crate::error::{SnapshotError, SnapshotResult};
use crate::path::{parent_dirs, validate_path};

/// A point-in-time mapping from relative paths to entries.
///
/// Entries are kept sorted by path (byte order). Construction with
/// [`Snapshot::new`] does not validate, so a caller can hand a malformed
/// snapshot to the diff engine and get a structured error back;
/// [`Snapshot::try_new`] validates up front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<Entry>,
}

impl Snapshot {
    /// Create a snapshot from entries in any order.
    ///
    /// Entries are sorted by path; duplicates are kept so that
    /// [`Snapshot::validate`] can report them.
    pub fn new(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| a.path().cmp(b.path()));
        Self { entries }
    }

    /// Create and validate a snapshot.
    pub fn try_new(entries: Vec<Entry>) -> SnapshotResult<Self> {
        let snapshot = Self::new(entries);
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check the structural invariants.
    ///
    /// - every path is normalized (see [`validate_path`]);
    /// - paths are unique;
    /// - no path is also used as a directory by another path.
    pub fn validate(&self) -> SnapshotResult<()> {
        for entry in &self.entries {
            validate_path(entry.path())?;
        }

        for pair in self.entries.windows(2) {
            if pair[0].path() == pair[1].path() {
                return Err(SnapshotError::DuplicatePath(pair[0].path().to_string()));
            }
        }

        let files: HashSet<&str> = self.entries.iter().map(Entry::path).collect();
        for entry in &self.entries {
            if let Some(dir) = parent_dirs(entry.path()).find(|dir| files.contains(dir)) {
                return Err(SnapshotError::PathCollision {
                    file: dir.to_string(),
                    nested: entry.path().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Look up an entry by path.
    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.entries
            .binary_search_by(|e| e.path().cmp(path))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Entries in path order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::path)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Entry> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snapdiff_store::InMemoryBlobStore;
    use snapdiff_types::{EntryMode, ObjectId};

    use super::*;

    fn entry(path: &str) -> Entry {
        let store = Arc::new(InMemoryBlobStore::new());
        Entry::new(path, EntryMode::Regular, ObjectId::for_content(path.as_bytes()), store)
    }

    #[test]
    fn entries_are_sorted() {
        let snap = Snapshot::new(vec![entry("zebra.txt"), entry("alpha.txt"), entry("m/x.txt")]);
        let paths: Vec<_> = snap.paths().collect();
        assert_eq!(paths, vec!["alpha.txt", "m/x.txt", "zebra.txt"]);
    }

    #[test]
    fn get_uses_exact_path() {
        let snap = Snapshot::new(vec![entry("a.txt"), entry("b.txt")]);
        assert!(snap.get("a.txt").is_some());
        assert!(snap.get("A.txt").is_none());
        assert!(snap.contains("b.txt"));
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn empty_snapshot_is_valid() {
        let snap = Snapshot::empty();
        assert!(snap.is_empty());
        assert!(snap.validate().is_ok());
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let err = Snapshot::try_new(vec![entry("a.txt"), entry("b.txt"), entry("a.txt")]).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicatePath(p) if p == "a.txt"));
    }

    #[test]
    fn file_directory_collision_is_rejected() {
        // "a-b" sorts between "a" and "a/b", so the check cannot rely on adjacency.
        let err = Snapshot::try_new(vec![entry("a"), entry("a-b"), entry("a/b")]).unwrap_err();
        match err {
            SnapshotError::PathCollision { file, nested } => {
                assert_eq!(file, "a");
                assert_eq!(nested, "a/b");
            }
            other => panic!("expected PathCollision, got {other:?}"),
        }
    }

    #[test]
    fn deep_collision_is_rejected() {
        let err = Snapshot::try_new(vec![entry("src/lib"), entry("src/lib/mod.rs")]).unwrap_err();
        assert!(matches!(err, SnapshotError::PathCollision { .. }));
    }

    #[test]
    fn invalid_path_is_rejected() {
        let err = Snapshot::try_new(vec![entry("../escape")]).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidPath { .. }));
    }

    #[test]
    fn collect_from_iterator() {
        let snap: Snapshot = vec![entry("b"), entry("a")].into_iter().collect();
        assert_eq!(snap.entries()[0].path(), "a");
    }
}
