//! Error types for the diff crate.
//!
//! [`DiffError`] aborts a whole diff and is only raised for structurally
//! invalid input. Problems with a single path's content are reported inline
//! on that path's entry as an [`EntryIssue`].

use std::fmt;

use serde::Serialize;
use snapdiff_snapshot::SnapshotError;

/// Which side of the comparison a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
        }
    }
}

/// Errors that abort a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// One of the snapshots violates its structural invariants.
    #[error("invalid {side} snapshot: {source}")]
    InvalidInput {
        side: Side,
        #[source]
        source: SnapshotError,
    },

    /// A worker task of the concurrent driver failed.
    #[error("diff task failed: {0}")]
    Task(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;

/// A per-path problem. The path is still reported, flagged binary with no
/// hunks, and carries the issue as its reason code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum EntryIssue {
    /// The content accessor for one side failed.
    #[error("content unavailable ({side} side): {reason}")]
    ContentUnavailable { side: Side, reason: String },

    /// Line diffing exceeded the per-path budget.
    #[error("diff too large: {limit}")]
    DiffTooLarge { limit: Budget },
}

/// The budget a path exceeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "budget", rename_all = "snake_case")]
pub enum Budget {
    /// Combined line count of both sides over `max`.
    Lines { lines: usize, max: usize },
    /// Wall-clock budget exhausted while diffing.
    Time { budget_ms: u64 },
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lines { lines, max } => write!(f, "{lines} lines exceeds limit of {max}"),
            Self::Time { budget_ms } => write!(f, "exceeded time budget of {budget_ms}ms"),
        }
    }
}
