//! Git-style text rendering of a [`SnapshotDiff`].
//!
//! Rendering is plain text; colouring is left to the caller, which can key
//! off the first character of each line.

use std::fmt::{self, Write};

use serde::Serialize;
use snapdiff_snapshot::Entry;
use snapdiff_types::ObjectId;

use crate::content_diff::{last_line_ops, Hunk, LineOp};
use crate::snapshot_diff::{ChangeKind, DiffEntry, SnapshotDiff};

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Widest `+`/`-` bar drawn by [`render_stat`].
const STAT_BAR_WIDTH: usize = 40;

/// Aggregate counts over a diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    /// Entries reported as binary, degraded ones included.
    pub binary: usize,
    pub degraded: usize,
}

impl DiffStats {
    pub fn from_diff(diff: &SnapshotDiff) -> Self {
        Self {
            files_changed: diff.len(),
            insertions: diff.insertions(),
            deletions: diff.deletions(),
            binary: diff.iter().filter(|e| e.is_binary).count(),
            degraded: diff.degraded().count(),
        }
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} changed, {} {}(+), {} {}(-)",
            self.files_changed,
            plural(self.files_changed, "file", "files"),
            self.insertions,
            plural(self.insertions, "insertion", "insertions"),
            self.deletions,
            plural(self.deletions, "deletion", "deletions"),
        )
    }
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}

/// Render `diff` as a unified diff.
pub fn render_unified(diff: &SnapshotDiff) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_unified(&mut out, diff);
    out
}

/// Write `diff` as a unified diff into `out`.
pub fn write_unified<W: Write>(out: &mut W, diff: &SnapshotDiff) -> fmt::Result {
    for entry in diff {
        write_entry(out, entry)?;
    }
    Ok(())
}

fn write_entry<W: Write>(out: &mut W, entry: &DiffEntry) -> fmt::Result {
    let path = &entry.path;
    writeln!(out, "diff --git a/{path} b/{path}")?;

    match (&entry.old, &entry.new) {
        (None, Some(new)) => writeln!(out, "new file mode {}", new.mode())?,
        (Some(old), None) => writeln!(out, "deleted file mode {}", old.mode())?,
        (Some(old), Some(new)) if old.mode() != new.mode() => {
            writeln!(out, "old mode {}", old.mode())?;
            writeln!(out, "new mode {}", new.mode())?;
        }
        _ => {}
    }

    if entry.kind == ChangeKind::ModeChanged {
        return Ok(());
    }

    let old_id = entry.old.as_ref().map_or(ObjectId::null(), Entry::content_id);
    let new_id = entry.new.as_ref().map_or(ObjectId::null(), Entry::content_id);
    write!(out, "index {}..{}", old_id.short_hex(), new_id.short_hex())?;
    match (&entry.old, &entry.new) {
        (Some(old), Some(new)) if old.mode() == new.mode() => writeln!(out, " {}", new.mode())?,
        _ => writeln!(out)?,
    }

    let old_label = entry.old.as_ref().map_or_else(|| "/dev/null".to_string(), |_| format!("a/{path}"));
    let new_label = entry.new.as_ref().map_or_else(|| "/dev/null".to_string(), |_| format!("b/{path}"));

    if let Some(issue) = &entry.issue {
        writeln!(out, "# {issue}")?;
    }
    if entry.is_binary {
        return writeln!(out, "Binary files {old_label} and {new_label} differ");
    }
    if entry.hunks.is_empty() {
        return Ok(());
    }

    writeln!(out, "--- {old_label}")?;
    writeln!(out, "+++ {new_label}")?;
    for hunk in &entry.hunks {
        write_hunk(out, hunk)?;
    }
    Ok(())
}

fn write_hunk<W: Write>(out: &mut W, hunk: &Hunk) -> fmt::Result {
    writeln!(
        out,
        "@@ -{} +{} @@",
        range(hunk.old_start, hunk.old_lines),
        range(hunk.new_start, hunk.new_lines)
    )?;

    let (last_old, last_new) = last_line_ops(hunk);
    for (i, op) in hunk.ops.iter().enumerate() {
        let prefix = match op {
            LineOp::Context(_) => ' ',
            LineOp::Insert(_) => '+',
            LineOp::Delete(_) => '-',
        };
        writeln!(out, "{prefix}{}", op.text())?;

        let ends_old = hunk.old_missing_newline && last_old == Some(i);
        let ends_new = hunk.new_missing_newline && last_new == Some(i);
        if ends_old || ends_new {
            writeln!(out, "{NO_NEWLINE_MARKER}")?;
        }
    }
    Ok(())
}

fn range(start: usize, lines: usize) -> String {
    if lines == 1 {
        start.to_string()
    } else {
        format!("{start},{lines}")
    }
}

/// Render a `--stat` style summary: one line per path plus a total.
pub fn render_stat(diff: &SnapshotDiff) -> String {
    let width = diff.iter().map(|e| e.path.len()).max().unwrap_or(0);
    let widest = diff
        .iter()
        .map(|e| e.insertions() + e.deletions())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for entry in diff {
        let path = &entry.path;
        if entry.is_binary {
            let _ = writeln!(out, " {path:<width$} | Bin");
            continue;
        }
        let ins = entry.insertions();
        let del = entry.deletions();
        let (ins_bar, del_bar) = if widest > STAT_BAR_WIDTH {
            (scale(ins, widest), scale(del, widest))
        } else {
            (ins, del)
        };
        let _ = writeln!(
            out,
            " {path:<width$} | {} {}{}",
            ins + del,
            "+".repeat(ins_bar),
            "-".repeat(del_bar)
        );
    }
    let _ = writeln!(out, " {}", diff.stats());
    out
}

fn scale(n: usize, widest: usize) -> usize {
    if n == 0 {
        0
    } else {
        (n * STAT_BAR_WIDTH / widest).max(1)
    }
}
