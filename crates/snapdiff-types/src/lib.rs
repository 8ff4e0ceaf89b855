//! Foundation types for snapdiff.
//!
//! Every other snapdiff crate depends on `snapdiff-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content identity of an entry (domain-separated BLAKE3 hash)
//! - [`EntryMode`] -- Kind of tracked path: regular file, executable, symlink

pub mod error;
pub mod mode;
pub mod object;

pub use error::TypeError;
pub use mode::EntryMode;
pub use object::ObjectId;
