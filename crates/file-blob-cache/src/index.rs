//! In-memory index from request keys to cached blobs
//!
//! The index is a plain data structure. Its owner is responsible for
//! serializing access to it.

use crate::types::{BlobId, CacheEntry};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CacheIndex {
    entries: HashMap<String, CacheEntry>,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Insert an entry, returning the one it replaced (if any)
    pub fn insert(&mut self, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    /// Point-in-time copy of all entries
    pub fn entries(&self) -> Vec<(String, CacheEntry)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains_blob(&self, blob_id: &BlobId) -> bool {
        self.entries.values().any(|e| &e.blob_id == blob_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.entries.values().map(|e| e.size).sum()
    }
}
