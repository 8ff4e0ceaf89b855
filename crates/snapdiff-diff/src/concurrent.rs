//! Concurrent driver for [`diff_snapshots`](crate::diff_snapshots).
//!
//! Paths are matched and classified up front, which fixes the output order.
//! Content work for each changed path then runs on tokio's blocking pool,
//! bounded by a semaphore, and results are collected in that fixed order
//! regardless of which task finishes first.

use std::sync::Arc;

use snapdiff_snapshot::Snapshot;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::options::DiffOptions;
use crate::snapshot_diff::{log_summary, pending_changes, resolve, validate_inputs, SnapshotDiff};

/// Compare `old` against `new` with at most `jobs` paths in flight.
///
/// Produces the same report as the sequential driver. `jobs` of 0 is
/// treated as 1.
pub async fn diff_snapshots_concurrent(
    old: &Snapshot,
    new: &Snapshot,
    options: &DiffOptions,
    jobs: usize,
) -> DiffResult<SnapshotDiff> {
    validate_inputs(old, new)?;

    let pending = pending_changes(old, new, options);
    let jobs = jobs.max(1);
    debug!(paths = pending.len(), jobs, "fanning out content diffs");

    let semaphore = Arc::new(Semaphore::new(jobs));
    let options = Arc::new(options.clone());
    let mut handles = Vec::with_capacity(pending.len());

    for change in pending {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| DiffError::Task(format!("semaphore closed: {e}")))?;
        let options = Arc::clone(&options);

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            resolve(change, &options)
        }));
    }

    let mut entries = Vec::with_capacity(handles.len());
    for handle in handles {
        let entry = handle
            .await
            .map_err(|e| DiffError::Task(format!("content diff panicked: {e}")))?;
        entries.push(entry);
    }

    let diff = SnapshotDiff { entries };
    log_summary(&diff);
    Ok(diff)
}
