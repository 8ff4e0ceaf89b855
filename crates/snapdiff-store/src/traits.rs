use std::sync::Arc;

use snapdiff_types::ObjectId;

use crate::error::StoreResult;

/// Capability to fetch the content of a snapshot entry.
///
/// Implementations must satisfy these invariants:
/// - `fetch` returns the complete content; partial reads are errors.
/// - Content returned for a given `id` hashes to that `id` whenever the
///   source can check it.
/// - Concurrent calls are safe.
pub trait ContentSource: Send + Sync {
    /// Fetch the full content of the entry at `path` with identity `id`.
    ///
    /// Content-addressed sources key on `id`; path-addressed sources (a
    /// working directory) key on `path`.
    fn fetch(&self, path: &str, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Short human-readable label, used in logs.
    fn label(&self) -> String;
}

impl<T: ContentSource + ?Sized> ContentSource for Arc<T> {
    fn fetch(&self, path: &str, id: &ObjectId) -> StoreResult<Vec<u8>> {
        (**self).fetch(path, id)
    }

    fn label(&self) -> String {
        (**self).label()
    }
}
