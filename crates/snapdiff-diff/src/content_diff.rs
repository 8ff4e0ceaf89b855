//! Content-level diff: binary sniffing and line-by-line comparison.
//!
//! Uses the `similar` crate's Myers implementation, which always produces a
//! minimal edit script unless a deadline cuts it short. Callers that set a
//! deadline must check it afterwards and discard the result if it passed.

use std::time::Instant;

use serde::Serialize;
use similar::{Algorithm, ChangeTag, TextDiff};

/// A contiguous region of changes plus surrounding context.
///
/// Line numbers are 1-based. When a side contributes no lines, its start is
/// the line after which the change applies (0 at the top of the file), as in
/// unified diff headers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    pub ops: Vec<LineOp>,
    /// The hunk ends at the old side's last line, which has no terminator.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub old_missing_newline: bool,
    /// The hunk ends at the new side's last line, which has no terminator.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub new_missing_newline: bool,
}

impl Hunk {
    pub fn insertions(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, LineOp::Insert(_))).count()
    }

    pub fn deletions(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, LineOp::Delete(_))).count()
    }
}

/// A single line in a hunk, without its `\n` terminator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "text", rename_all = "lowercase")]
pub enum LineOp {
    /// Present in both versions.
    Context(String),
    /// Present only in the new version.
    Insert(String),
    /// Present only in the old version.
    Delete(String),
}

impl LineOp {
    pub fn text(&self) -> &str {
        match self {
            Self::Context(t) | Self::Insert(t) | Self::Delete(t) => t,
        }
    }

    fn consumes_old(&self) -> bool {
        matches!(self, Self::Context(_) | Self::Delete(_))
    }

    fn consumes_new(&self) -> bool {
        matches!(self, Self::Context(_) | Self::Insert(_))
    }
}

/// Returns `true` if `data` looks binary.
///
/// Only the first `sniff_len` bytes are inspected: content is binary if that
/// window contains a NUL byte or is not valid UTF-8. A multi-byte character
/// cut off by the end of the window does not count as invalid.
pub fn looks_binary(data: &[u8], sniff_len: usize) -> bool {
    let window = &data[..data.len().min(sniff_len)];
    if window.contains(&0) {
        return true;
    }
    match std::str::from_utf8(window) {
        Ok(_) => false,
        Err(e) => e.error_len().is_some() || window.len() == data.len(),
    }
}

/// Number of lines in `text`; a final line without terminator counts.
pub fn line_count(text: &str) -> usize {
    let newlines = text.bytes().filter(|&b| b == b'\n').count();
    if text.is_empty() || text.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

/// Compute grouped hunks between two texts.
///
/// Lines are compared including their terminators, so a missing final
/// newline shows up as a changed last line. Changes separated by at most
/// `2 * context` unchanged lines share a hunk.
pub fn diff_lines(old: &str, new: &str, context: usize, deadline: Option<Instant>) -> Vec<Hunk> {
    let mut config = TextDiff::configure();
    config.algorithm(Algorithm::Myers);
    if let Some(deadline) = deadline {
        config.deadline(deadline);
    }
    let text_diff = config.diff_lines(old, new);

    let old_total = line_count(old);
    let new_total = line_count(new);
    let old_open = !old.is_empty() && !old.ends_with('\n');
    let new_open = !new.is_empty() && !new.ends_with('\n');

    let mut hunks = Vec::new();
    for group in text_diff.grouped_ops(context) {
        let Some(first) = group.first() else {
            continue;
        };
        let old_index = first.old_range().start;
        let new_index = first.new_range().start;

        let mut ops = Vec::new();
        let mut old_lines = 0usize;
        let mut new_lines = 0usize;
        for op in &group {
            for change in text_diff.iter_changes(op) {
                let value = change.value();
                let text = value.strip_suffix('\n').unwrap_or(value).to_string();
                match change.tag() {
                    ChangeTag::Equal => {
                        ops.push(LineOp::Context(text));
                        old_lines += 1;
                        new_lines += 1;
                    }
                    ChangeTag::Delete => {
                        ops.push(LineOp::Delete(text));
                        old_lines += 1;
                    }
                    ChangeTag::Insert => {
                        ops.push(LineOp::Insert(text));
                        new_lines += 1;
                    }
                }
            }
        }

        hunks.push(Hunk {
            old_start: if old_lines == 0 { old_index } else { old_index + 1 },
            old_lines,
            new_start: if new_lines == 0 { new_index } else { new_index + 1 },
            new_lines,
            ops,
            old_missing_newline: old_open && old_lines > 0 && old_index + old_lines == old_total,
            new_missing_newline: new_open && new_lines > 0 && new_index + new_lines == new_total,
        });
    }

    hunks
}

/// Index of the last op that consumes an old line and a new line.
pub(crate) fn last_line_ops(hunk: &Hunk) -> (Option<usize>, Option<usize>) {
    let last_old = hunk.ops.iter().rposition(LineOp::consumes_old);
    let last_new = hunk.ops.iter().rposition(LineOp::consumes_new);
    (last_old, last_new)
}
