//! Snapshot diff engine.
//!
//! Compares two [`Snapshot`]s and produces an ordered list of per-path
//! changes. Text entries carry line-level hunks computed with a minimal Myers
//! diff; binary entries are flagged and carry none. The engine is a pure
//! function of its inputs: it holds no state and never touches storage except
//! through each entry's content handle.
//!
//! # Key Types
//!
//! - [`SnapshotDiff`] / [`DiffEntry`] / [`ChangeKind`] -- per-path report
//! - [`Hunk`] / [`LineOp`] -- line-level changes with context
//! - [`DiffOptions`] / [`PathFilter`] -- per-call configuration
//! - [`DiffError`] -- fatal errors; [`EntryIssue`] -- per-path degradations
//!
//! # Entry Points
//!
//! - [`diff_snapshots`] -- single-threaded diff
//! - [`diff_snapshots_concurrent`] -- fans per-path work out to blocking tasks
//! - [`render_unified`] -- git-style text rendering of a report

pub mod concurrent;
pub mod content_diff;
pub mod error;
pub mod options;
pub mod snapshot_diff;
pub mod unified;

pub use concurrent::diff_snapshots_concurrent;
pub use content_diff::{diff_lines, looks_binary, Hunk, LineOp};
pub use error::{Budget, DiffError, DiffResult, EntryIssue, Side};
pub use options::{DiffOptions, PathFilter, DEFAULT_CONTEXT_LINES, DEFAULT_MAX_LINES, DEFAULT_SNIFF_LEN};
pub use snapshot_diff::{diff_snapshots, ChangeKind, DiffEntry, SnapshotDiff};
pub use unified::{render_stat, render_unified, write_unified, DiffStats};

pub use snapdiff_snapshot::{Entry, Snapshot};
