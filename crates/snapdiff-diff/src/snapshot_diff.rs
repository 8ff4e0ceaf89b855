//! Snapshot-level diff: match paths across two snapshots, classify each one,
//! and compute line hunks for text content.
//!
//! Both snapshots keep their entries sorted by path, so matching is a single
//! merge pass and the report comes out in path order without a final sort.

use std::cmp::Ordering;
use std::time::Instant;

use serde::Serialize;
use snapdiff_snapshot::{Entry, Snapshot};
use snapdiff_types::EntryMode;
use tracing::{debug, info, warn};

use crate::content_diff::{diff_lines, line_count, looks_binary, Hunk};
use crate::error::{Budget, DiffError, DiffResult, EntryIssue, Side};
use crate::options::DiffOptions;
use crate::unified::DiffStats;

/// How a path differs between the two snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present only in the new snapshot.
    Added,
    /// Present only in the old snapshot.
    Deleted,
    /// Present in both with different content.
    Modified,
    /// Same content, different mode.
    ModeChanged,
}

/// The report for one changed path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub path: String,
    pub kind: ChangeKind,
    /// The old entry; absent for [`ChangeKind::Added`].
    pub old: Option<Entry>,
    /// The new entry; absent for [`ChangeKind::Deleted`].
    pub new: Option<Entry>,
    /// Set for binary content and for degraded entries.
    pub is_binary: bool,
    /// Empty when binary, degraded, or mode-only.
    pub hunks: Vec<Hunk>,
    /// Why the entry was degraded, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<EntryIssue>,
}

impl DiffEntry {
    pub fn old_mode(&self) -> Option<EntryMode> {
        self.old.as_ref().map(Entry::mode)
    }

    pub fn new_mode(&self) -> Option<EntryMode> {
        self.new.as_ref().map(Entry::mode)
    }

    pub fn insertions(&self) -> usize {
        self.hunks.iter().map(Hunk::insertions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(Hunk::deletions).sum()
    }

    /// Returns `true` if content could not be fully diffed.
    pub fn is_degraded(&self) -> bool {
        self.issue.is_some()
    }

    fn degrade(&mut self, issue: EntryIssue) {
        warn!(path = %self.path, %issue, "entry degraded");
        self.is_binary = true;
        self.hunks.clear();
        self.issue = Some(issue);
    }
}

/// The ordered result of comparing two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    /// Changed paths in lexicographic byte order.
    pub entries: Vec<DiffEntry>,
}

impl SnapshotDiff {
    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of changed paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry> {
        self.entries.iter()
    }

    /// Look up the change for `path`.
    pub fn get(&self, path: &str) -> Option<&DiffEntry> {
        self.entries
            .binary_search_by(|e| e.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Number of changes of the given kind.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn insertions(&self) -> usize {
        self.entries.iter().map(DiffEntry::insertions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.entries.iter().map(DiffEntry::deletions).sum()
    }

    /// Entries that carry an issue.
    pub fn degraded(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.is_degraded())
    }

    /// Summary counts for this diff.
    pub fn stats(&self) -> DiffStats {
        DiffStats::from_diff(self)
    }
}

impl<'a> IntoIterator for &'a SnapshotDiff {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Compare `old` against `new`.
///
/// Fails only if either snapshot is structurally invalid. Content problems
/// on a single path are reported on that path's [`DiffEntry::issue`].
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot, options: &DiffOptions) -> DiffResult<SnapshotDiff> {
    validate_inputs(old, new)?;

    let entries: Vec<DiffEntry> = pending_changes(old, new, options)
        .into_iter()
        .map(|change| resolve(change, options))
        .collect();

    let diff = SnapshotDiff { entries };
    log_summary(&diff);
    Ok(diff)
}

/// A classified path whose content has not been looked at yet.
#[derive(Debug)]
pub(crate) struct PendingChange {
    path: String,
    kind: ChangeKind,
    old: Option<Entry>,
    new: Option<Entry>,
}

pub(crate) fn validate_inputs(old: &Snapshot, new: &Snapshot) -> DiffResult<()> {
    old.validate()
        .map_err(|source| DiffError::InvalidInput { side: Side::Old, source })?;
    new.validate()
        .map_err(|source| DiffError::InvalidInput { side: Side::New, source })?;
    Ok(())
}

/// Merge both snapshots by path and classify every path that passes the
/// filter. Unchanged paths are dropped here.
pub(crate) fn pending_changes(old: &Snapshot, new: &Snapshot, options: &DiffOptions) -> Vec<PendingChange> {
    let mut changes = Vec::new();
    let mut old_iter = old.iter().peekable();
    let mut new_iter = new.iter().peekable();

    loop {
        let order = match (old_iter.peek(), new_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(o), Some(n)) => o.path().cmp(n.path()),
        };
        let (old_entry, new_entry) = match order {
            Ordering::Less => (old_iter.next(), None),
            Ordering::Greater => (None, new_iter.next()),
            Ordering::Equal => (old_iter.next(), new_iter.next()),
        };

        let kind = match (old_entry, new_entry) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Deleted,
            (Some(o), Some(n)) if o.content_id() != n.content_id() => ChangeKind::Modified,
            (Some(o), Some(n)) if o.mode() != n.mode() => ChangeKind::ModeChanged,
            _ => continue,
        };
        let Some(path) = old_entry.or(new_entry).map(Entry::path) else {
            continue;
        };
        if !options.includes(path) {
            continue;
        }

        debug!(path, ?kind, "classified");
        changes.push(PendingChange {
            path: path.to_string(),
            kind,
            old: old_entry.cloned(),
            new: new_entry.cloned(),
        });
    }

    changes
}

/// Turn a classified path into its report, diffing content where needed.
pub(crate) fn resolve(change: PendingChange, options: &DiffOptions) -> DiffEntry {
    let mut entry = DiffEntry {
        path: change.path,
        kind: change.kind,
        old: change.old,
        new: change.new,
        is_binary: false,
        hunks: Vec::new(),
        issue: None,
    };
    if entry.kind != ChangeKind::ModeChanged {
        diff_content(&mut entry, options);
    }
    entry
}

fn diff_content(entry: &mut DiffEntry, options: &DiffOptions) {
    let old = match fetch(entry.old.as_ref(), Side::Old) {
        Ok(bytes) => bytes,
        Err(issue) => return entry.degrade(issue),
    };
    let new = match fetch(entry.new.as_ref(), Side::New) {
        Ok(bytes) => bytes,
        Err(issue) => return entry.degrade(issue),
    };

    if options.detect_binary
        && (looks_binary(&old, options.binary_sniff_len) || looks_binary(&new, options.binary_sniff_len))
    {
        debug!(path = %entry.path, "binary content");
        entry.is_binary = true;
        return;
    }

    // Content that is not UTF-8 cannot be line-diffed; it is reported as
    // binary whether or not sniffing is enabled.
    let (Ok(old_text), Ok(new_text)) = (std::str::from_utf8(&old), std::str::from_utf8(&new)) else {
        debug!(path = %entry.path, "unsupported encoding, treating as binary");
        entry.is_binary = true;
        return;
    };

    if let Some(max) = options.max_lines {
        let lines = line_count(old_text) + line_count(new_text);
        if lines > max {
            return entry.degrade(EntryIssue::DiffTooLarge {
                limit: Budget::Lines { lines, max },
            });
        }
    }

    let deadline = options.time_budget().map(|budget| Instant::now() + budget);
    let hunks = diff_lines(old_text, new_text, options.context_lines, deadline);
    if let (Some(deadline), Some(budget_ms)) = (deadline, options.time_budget_ms) {
        // Past the deadline the edit script is no longer guaranteed minimal.
        if Instant::now() >= deadline {
            return entry.degrade(EntryIssue::DiffTooLarge {
                limit: Budget::Time { budget_ms },
            });
        }
    }

    debug!(path = %entry.path, hunks = hunks.len(), "content diffed");
    entry.hunks = hunks;
}

/// Read one side's content; an absent side is empty.
fn fetch(entry: Option<&Entry>, side: Side) -> Result<Vec<u8>, EntryIssue> {
    match entry {
        None => Ok(Vec::new()),
        Some(entry) => entry.content().map_err(|e| EntryIssue::ContentUnavailable {
            side,
            reason: e.to_string(),
        }),
    }
}

pub(crate) fn log_summary(diff: &SnapshotDiff) {
    info!(
        changed = diff.len(),
        added = diff.count(ChangeKind::Added),
        deleted = diff.count(ChangeKind::Deleted),
        modified = diff.count(ChangeKind::Modified),
        mode_changed = diff.count(ChangeKind::ModeChanged),
        degraded = diff.degraded().count(),
        "snapshot diff complete"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use snapdiff_snapshot::{SnapshotBuilder, SnapshotError};
    use snapdiff_store::{ContentSource, InMemoryBlobStore, StoreError, StoreResult};
    use snapdiff_types::ObjectId;

    use super::*;
    use crate::content_diff::LineOp;
    use crate::options::PathFilter;

    fn snapshot(files: &[(&str, &[u8])]) -> Snapshot {
        let mut builder = SnapshotBuilder::new(Arc::new(InMemoryBlobStore::new()));
        for (path, content) in files {
            builder.add_file(path, content, EntryMode::Regular).unwrap();
        }
        builder.build().unwrap()
    }

    fn committed() -> Snapshot {
        snapshot(&[
            ("file1.txt", b"Original content\nfor file1\n"),
            ("file2.txt", b"Original content\nfor file2\n"),
        ])
    }

    fn working() -> Snapshot {
        snapshot(&[
            ("file1.txt", b"Modified content\nfor file1\nwith new line\n"),
            ("file3.txt", b"New file content\n"),
        ])
    }

    struct Unreadable;

    impl ContentSource for Unreadable {
        fn fetch(&self, _path: &str, id: &ObjectId) -> StoreResult<Vec<u8>> {
            Err(StoreError::NotFound(*id))
        }

        fn label(&self) -> String {
            "unreadable".into()
        }
    }

    #[test]
    fn edit_add_delete_scenario() {
        let diff = diff_snapshots(&committed(), &working(), &DiffOptions::default()).unwrap();
        let paths: Vec<_> = diff.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["file1.txt", "file2.txt", "file3.txt"]);

        let file1 = diff.get("file1.txt").unwrap();
        assert_eq!(file1.kind, ChangeKind::Modified);
        assert!(!file1.is_binary);
        assert_eq!(file1.hunks.len(), 1);
        assert_eq!(
            file1.hunks[0].ops,
            vec![
                LineOp::Delete("Original content".into()),
                LineOp::Insert("Modified content".into()),
                LineOp::Context("for file1".into()),
                LineOp::Insert("with new line".into()),
            ]
        );

        let file2 = diff.get("file2.txt").unwrap();
        assert_eq!(file2.kind, ChangeKind::Deleted);
        assert!(file2.new.is_none());
        assert_eq!(file2.deletions(), 2);

        let file3 = diff.get("file3.txt").unwrap();
        assert_eq!(file3.kind, ChangeKind::Added);
        assert!(file3.old.is_none());
        assert_eq!(file3.hunks.len(), 1);
        assert_eq!(file3.hunks[0].ops, vec![LineOp::Insert("New file content".into())]);
    }

    #[test]
    fn identical_snapshots_produce_empty_diff() {
        let snap = committed();
        assert!(diff_snapshots(&snap, &snap, &DiffOptions::default()).unwrap().is_empty());
        assert!(diff_snapshots(&Snapshot::empty(), &Snapshot::empty(), &DiffOptions::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn mode_only_change_has_no_hunks() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut builder = SnapshotBuilder::new(store.clone());
        builder.add_file("run.sh", b"#!/bin/sh\n", EntryMode::Regular).unwrap();
        let old = builder.build().unwrap();
        builder.set_mode("run.sh", EntryMode::Executable).unwrap();
        let new = builder.build().unwrap();

        let diff = diff_snapshots(&old, &new, &DiffOptions::default()).unwrap();
        assert_eq!(diff.len(), 1);
        let entry = &diff.entries[0];
        assert_eq!(entry.kind, ChangeKind::ModeChanged);
        assert!(entry.hunks.is_empty());
        assert_eq!(entry.old_mode(), Some(EntryMode::Regular));
        assert_eq!(entry.new_mode(), Some(EntryMode::Executable));
    }

    #[test]
    fn nul_byte_makes_entry_binary_for_any_context() {
        let old = snapshot(&[("data.bin", b"text\n")]);
        let new = snapshot(&[("data.bin", b"te\0xt\n")]);
        for context in [0, 3, 100] {
            let opts = DiffOptions::default().with_context_lines(context);
            let diff = diff_snapshots(&old, &new, &opts).unwrap();
            let entry = &diff.entries[0];
            assert_eq!(entry.kind, ChangeKind::Modified);
            assert!(entry.is_binary);
            assert!(entry.hunks.is_empty());
            assert!(entry.issue.is_none());
        }
    }

    #[test]
    fn invalid_utf8_is_binary_even_without_sniffing() {
        let old = snapshot(&[("latin1.txt", b"caf\xe9\n")]);
        let new = snapshot(&[("latin1.txt", b"caf\xe9s\n")]);
        let opts = DiffOptions::default().without_binary_detection();
        let diff = diff_snapshots(&old, &new, &opts).unwrap();
        let entry = &diff.entries[0];
        assert!(entry.is_binary);
        assert!(entry.hunks.is_empty());
    }

    #[test]
    fn nul_without_sniffing_is_line_diffed() {
        let old = snapshot(&[("f", b"a\0\n")]);
        let new = snapshot(&[("f", b"b\0\n")]);
        let opts = DiffOptions::default().without_binary_detection();
        let diff = diff_snapshots(&old, &new, &opts).unwrap();
        let entry = &diff.entries[0];
        assert!(!entry.is_binary);
        assert_eq!(entry.hunks.len(), 1);
    }

    #[test]
    fn unreadable_content_degrades_one_path() {
        let old = committed();
        let mut entries: Vec<Entry> = working().entries().to_vec();
        let broken = Entry::new(
            "file1.txt",
            EntryMode::Regular,
            ObjectId::for_content(b"gone"),
            Arc::new(Unreadable),
        );
        entries.retain(|e| e.path() != "file1.txt");
        entries.push(broken);
        let new = Snapshot::new(entries);

        let diff = diff_snapshots(&old, &new, &DiffOptions::default()).unwrap();
        assert_eq!(diff.len(), 3);
        let file1 = diff.get("file1.txt").unwrap();
        assert!(file1.is_binary);
        assert!(file1.hunks.is_empty());
        assert!(matches!(
            file1.issue,
            Some(EntryIssue::ContentUnavailable { side: Side::New, .. })
        ));
        assert_eq!(diff.degraded().count(), 1);
        assert!(!diff.get("file3.txt").unwrap().is_degraded());
    }

    #[test]
    fn line_budget_degrades_large_entries() {
        let old = committed();
        let new = working();
        let opts = DiffOptions::default().with_max_lines(Some(4));
        let diff = diff_snapshots(&old, &new, &opts).unwrap();

        // file1: 2 + 3 lines, over budget; file2 and file3 fit.
        let file1 = diff.get("file1.txt").unwrap();
        assert_eq!(
            file1.issue,
            Some(EntryIssue::DiffTooLarge {
                limit: Budget::Lines { lines: 5, max: 4 }
            })
        );
        assert!(file1.is_binary);
        assert!(diff.get("file2.txt").unwrap().issue.is_none());
    }

    #[test]
    fn exhausted_time_budget_degrades_entries() {
        let opts = DiffOptions::default().with_time_budget(Duration::ZERO);
        let diff = diff_snapshots(&committed(), &working(), &opts).unwrap();
        assert_eq!(diff.len(), 3);
        for entry in &diff {
            assert!(matches!(
                entry.issue,
                Some(EntryIssue::DiffTooLarge {
                    limit: Budget::Time { budget_ms: 0 }
                })
            ));
        }
    }

    #[test]
    fn path_filter_restricts_report() {
        let opts = DiffOptions::default().with_path_filter(PathFilter::new(|p| p != "file2.txt"));
        let diff = diff_snapshots(&committed(), &working(), &opts).unwrap();
        let paths: Vec<_> = diff.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["file1.txt", "file3.txt"]);
    }

    #[test]
    fn duplicate_path_is_invalid_input() {
        let store: Arc<InMemoryBlobStore> = Arc::new(InMemoryBlobStore::new());
        let id = store.write_blob(b"x");
        let dup = Snapshot::new(vec![
            Entry::new("a.txt", EntryMode::Regular, id, store.clone()),
            Entry::new("a.txt", EntryMode::Regular, id, store),
        ]);
        let err = diff_snapshots(&committed(), &dup, &DiffOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DiffError::InvalidInput {
                side: Side::New,
                source: SnapshotError::DuplicatePath(_)
            }
        ));
    }

    #[test]
    fn file_directory_collision_is_invalid_input() {
        let store: Arc<InMemoryBlobStore> = Arc::new(InMemoryBlobStore::new());
        let id = store.write_blob(b"x");
        let bad = Snapshot::new(vec![
            Entry::new("docs", EntryMode::Regular, id, store.clone()),
            Entry::new("docs/readme.md", EntryMode::Regular, id, store),
        ]);
        let err = diff_snapshots(&bad, &Snapshot::empty(), &DiffOptions::default()).unwrap_err();
        assert!(matches!(err, DiffError::InvalidInput { side: Side::Old, .. }));
    }

    #[test]
    fn file_replaced_by_directory_across_snapshots() {
        let old = snapshot(&[("docs", b"flat\n")]);
        let new = snapshot(&[("docs/readme.md", b"nested\n")]);
        let diff = diff_snapshots(&old, &new, &DiffOptions::default()).unwrap();
        assert_eq!(diff.get("docs").unwrap().kind, ChangeKind::Deleted);
        assert_eq!(diff.get("docs/readme.md").unwrap().kind, ChangeKind::Added);
    }

    #[test]
    fn symlink_retarget_is_text_diffed() {
        let mut a = SnapshotBuilder::new(Arc::new(InMemoryBlobStore::new()));
        a.add_symlink("latest", "v1").unwrap();
        let mut b = SnapshotBuilder::new(Arc::new(InMemoryBlobStore::new()));
        b.add_symlink("latest", "v2").unwrap();

        let diff = diff_snapshots(&a.build().unwrap(), &b.build().unwrap(), &DiffOptions::default()).unwrap();
        let entry = &diff.entries[0];
        assert_eq!(entry.kind, ChangeKind::Modified);
        assert_eq!(entry.hunks[0].ops, vec![LineOp::Delete("v1".into()), LineOp::Insert("v2".into())]);
        assert!(entry.hunks[0].old_missing_newline);
    }

    #[test]
    fn summary_counts() {
        let diff = diff_snapshots(&committed(), &working(), &DiffOptions::default()).unwrap();
        assert_eq!(diff.count(ChangeKind::Added), 1);
        assert_eq!(diff.count(ChangeKind::Deleted), 1);
        assert_eq!(diff.count(ChangeKind::Modified), 1);
        // file1: +2 -1, file2: -2, file3: +1
        assert_eq!(diff.insertions(), 3);
        assert_eq!(diff.deletions(), 3);
    }

    #[test]
    fn report_serializes_to_json() {
        let diff = diff_snapshots(&committed(), &working(), &DiffOptions::default()).unwrap();
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["entries"][0]["path"], "file1.txt");
        assert_eq!(json["entries"][0]["kind"], "modified");
        assert_eq!(json["entries"][1]["new"], serde_json::Value::Null);
        assert!(json["entries"][0].get("issue").is_none());
    }
}
