//! Snapshot model for snapdiff.
//!
//! A [`Snapshot`] is an immutable, point-in-time mapping from relative paths
//! to [`Entry`] values. Snapshots are produced by collaborators that know
//! about storage: [`SnapshotBuilder`] records content into an in-memory blob
//! store (a "commit"), and [`scan_workdir`] captures a working directory.
//!
//! # Key Types
//!
//! - [`Entry`] -- path, mode, content identity, and a lazy content handle
//! - [`Snapshot`] -- sorted entries with structural validation
//! - [`SnapshotBuilder`] -- stage content into a store and build a snapshot
//! - [`ScanOptions`] / [`scan_workdir`] -- working-tree capture

pub mod builder;
pub mod entry;
pub mod error;
pub mod path;
pub mod scan;
pub mod snapshot;

pub use builder::SnapshotBuilder;
pub use entry::Entry;
pub use error::{SnapshotError, SnapshotResult};
pub use path::validate_path;
pub use scan::{scan_workdir, ScanOptions};
pub use snapshot::Snapshot;

pub use snapdiff_types::{EntryMode, ObjectId};
