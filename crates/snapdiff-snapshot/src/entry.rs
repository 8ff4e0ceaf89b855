//! Snapshot entries.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use snapdiff_store::{ContentSource, StoreResult};
use snapdiff_types::{EntryMode, ObjectId};

/// A single tracked path: metadata plus a lazy content handle.
///
/// Entries are immutable. Cloning is cheap: the content source is shared.
/// Equality compares path, mode, and content identity, never content bytes.
#[derive(Clone)]
pub struct Entry {
    path: String,
    mode: EntryMode,
    content_id: ObjectId,
    source: Arc<dyn ContentSource>,
}

impl Entry {
    /// Create an entry whose content is served by `source`.
    pub fn new(
        path: impl Into<String>,
        mode: EntryMode,
        content_id: ObjectId,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            path: path.into(),
            mode,
            content_id,
            source,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn content_id(&self) -> ObjectId {
        self.content_id
    }

    /// Fetch the full content through the entry's source.
    pub fn content(&self) -> StoreResult<Vec<u8>> {
        self.source.fetch(&self.path, &self.content_id)
    }

    /// Label of the backing content source.
    pub fn source_label(&self) -> String {
        self.source.label()
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.mode == other.mode && self.content_id == other.content_id
    }
}

impl Eq for Entry {}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("content_id", &self.content_id)
            .finish()
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Entry", 3)?;
        s.serialize_field("path", &self.path)?;
        s.serialize_field("mode", &self.mode)?;
        s.serialize_field("content_id", &self.content_id.to_hex())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapdiff_store::InMemoryBlobStore;

    #[test]
    fn content_reads_through_source() {
        let store = Arc::new(InMemoryBlobStore::new());
        let id = store.write_blob(b"New file content\n");
        let entry = Entry::new("file3.txt", EntryMode::Regular, id, store);
        assert_eq!(entry.content().unwrap(), b"New file content\n");
        assert!(entry.source_label().starts_with("memory("));
    }

    #[test]
    fn equality_ignores_source() {
        let a = Arc::new(InMemoryBlobStore::new());
        let b = Arc::new(InMemoryBlobStore::new());
        let id = ObjectId::for_content(b"x");
        let left = Entry::new("x", EntryMode::Regular, id, a);
        let right = Entry::new("x", EntryMode::Regular, id, b);
        assert_eq!(left, right);
    }

    #[test]
    fn serializes_metadata_only() {
        let store = Arc::new(InMemoryBlobStore::new());
        let id = store.write_blob(b"#!/bin/sh\n");
        let entry = Entry::new("run.sh", EntryMode::Executable, id, store);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["path"], "run.sh");
        assert_eq!(json["mode"], "executable");
        assert_eq!(json["content_id"], id.to_hex());
    }
}
