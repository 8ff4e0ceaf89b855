//! Content sources for snapdiff.
//!
//! The diff engine never touches storage directly. It reads entry content
//! through the [`ContentSource`] capability, which snapshot builders attach to
//! every entry they create.
//!
//! # Sources
//!
//! - [`InMemoryBlobStore`] -- content-addressed blobs held in memory (the
//!   "committed" side in tests and in the demo)
//! - [`WorkdirSource`] -- lazily reads files and symlink targets from a
//!   working directory
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written; the same bytes always get the same id.
//! 2. Concurrent reads are always safe.
//! 3. Sources never interpret content.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod traits;
pub mod workdir;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlobStore;
pub use traits::ContentSource;
pub use workdir::{read_link_target, WorkdirSource};
