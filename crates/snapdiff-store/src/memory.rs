use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use snapdiff_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentSource;

/// In-memory, content-addressed blob store.
///
/// Blobs are held behind a `RwLock` for safe concurrent access and cloned on
/// read. Because blobs are immutable, a poisoned lock still guards consistent
/// data and is recovered rather than propagated.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Store `data` and return its identity.
    ///
    /// Idempotent: writing the same bytes twice returns the same id.
    pub fn write_blob(&self, data: &[u8]) -> ObjectId {
        let id = ObjectId::for_content(data);
        let mut map = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(id).or_insert_with(|| data.to_vec());
        id
    }

    /// Read a blob by id.
    pub fn read_blob(&self, id: &ObjectId) -> Option<Vec<u8>> {
        let map = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        map.get(id).cloned()
    }

    /// Check whether a blob exists.
    pub fn exists(&self, id: &ObjectId) -> bool {
        let map = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        map.contains_key(id)
    }

    /// Delete a blob. Returns `true` if it existed.
    pub fn delete(&self, id: &ObjectId) -> bool {
        let mut map = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(id).is_some()
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|data| data.len() as u64)
            .sum()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSource for InMemoryBlobStore {
    fn fetch(&self, _path: &str, id: &ObjectId) -> StoreResult<Vec<u8>> {
        self.read_blob(id).ok_or(StoreError::NotFound(*id))
    }

    fn label(&self) -> String {
        format!("memory({} blobs)", self.len())
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
