//! Blob cache: on-disk blobs plus an in-memory, TTL-swept index

use crate::clock::{Clock, SystemClock};
use crate::error::{BlobCacheError, Result};
use crate::index::CacheIndex;
use crate::store::BlobStore;
use crate::types::{CacheEntry, CacheStats, CacheStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Two hours
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// A blob cache keyed by verbatim request strings
///
/// Readers (lookups and hit reads) hold the index read lock; inserts, removals
/// and sweeps hold the write lock. Network work done by callers of
/// [`BlobCache::get_or_fetch`] happens with no index lock held.
pub struct BlobCache {
    index: RwLock<CacheIndex>,
    store: BlobStore,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    /// Per-key locks for misses currently being fetched
    in_flight: Mutex<HashMap<String, InFlight>>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl BlobCache {
    /// Create a new blob cache using the wall clock
    pub fn new(cache_dir: PathBuf, ttl: Duration) -> Self {
        Self::with_clock(BlobStore::new(cache_dir), ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(store: BlobStore, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            index: RwLock::new(CacheIndex::new()),
            store,
            ttl: chrono::Duration::milliseconds(ttl_ms),
            clock,
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    /// Initialize the cache by ensuring the cache directory exists
    pub async fn init(&self) -> Result<()> {
        self.store.init().await
    }

    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Delete every blob on disk that no index entry refers to
    ///
    /// The index is never persisted, so at startup this clears whatever a
    /// previous process left behind.
    pub async fn reconcile(&self) -> Result<usize> {
        let index = self.index.write().await;
        let mut removed = 0;

        for id in self.store.list().await? {
            if index.contains_blob(&id) {
                continue;
            }
            if self.store.delete(&id).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, dir = ?self.store.dir(), "Removed orphaned blobs");
        }
        Ok(removed)
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.inserted_at >= self.ttl
    }

    /// Remove every entry whose age has reached the TTL, deleting its blob
    pub async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut index = self.index.write().await;
        let mut removed = 0;

        for (key, entry) in index.entries() {
            if !self.is_expired(&entry, now) {
                continue;
            }
            index.remove(&key);
            removed += 1;

            if let Err(e) = self.store.delete(&entry.blob_id).await {
                warn!(key = %key, blob_id = %entry.blob_id, error = %e, "Failed to delete expired blob");
            }
            debug!(key = %key, blob_id = %entry.blob_id, "Cache entry expired");
        }

        if removed > 0 {
            self.expired.fetch_add(removed as u64, Ordering::Relaxed);
        }
        removed
    }

    /// Run [`BlobCache::sweep`] on a fixed interval until the task is aborted
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = cache.sweep().await;
                if removed > 0 {
                    debug!(removed, "Background sweep removed expired entries");
                }
            }
        })
    }

    /// Look up a live entry without reading its blob
    pub async fn lookup(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        let index = self.index.read().await;
        index
            .lookup(key)
            .filter(|entry| !self.is_expired(entry, now))
            .cloned()
    }

    /// Read the blob for `key` while holding the index read lock
    async fn read_entry(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = self.clock.now();
        let index = self.index.read().await;

        let Some(entry) = index.lookup(key).filter(|e| !self.is_expired(e, now)) else {
            return Ok(None);
        };

        match self.store.read(&entry.blob_id).await {
            Ok(data) => Ok(Some(data)),
            Err(BlobCacheError::NotFound(id)) => {
                warn!(key = %key, blob_id = %id, "Index refers to a blob that is gone from disk");
                Err(BlobCacheError::NotFound(id))
            }
            Err(e) => Err(e),
        }
    }

    /// Get a blob from the cache
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let found = self.read_entry(key).await?;
        self.record(found.is_some(), key);
        Ok(found)
    }

    fn record(&self, hit: bool, key: &str) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
        }
    }

    /// Store a blob in the cache
    ///
    /// The blob is written before the index is touched. If the key was
    /// already cached, the replaced blob is deleted.
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<CacheEntry> {
        let blob_id = self.store.write(data).await?;
        let entry = CacheEntry {
            key: key.to_string(),
            blob_id,
            size: data.len() as u64,
            inserted_at: self.clock.now(),
        };

        let mut index = self.index.write().await;
        if let Some(old) = index.insert(entry.clone()) {
            if let Err(e) = self.store.delete(&old.blob_id).await {
                warn!(key = %key, blob_id = %old.blob_id, error = %e, "Failed to delete replaced blob");
            }
        }

        debug!(key = %key, blob_id = %entry.blob_id, size = entry.size, "Cached blob");
        Ok(entry)
    }

    /// Serve `key` from the cache, or run `fetch` and cache its result
    ///
    /// Concurrent misses for the same key are coalesced: one caller runs
    /// `fetch`, the others wait and are then served from the cache. A failed
    /// fetch caches nothing and the next waiter tries again.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
    ) -> std::result::Result<(Vec<u8>, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<u8>, E>>,
        E: From<BlobCacheError>,
    {
        if let Some(data) = self.read_entry(key).await? {
            self.record(true, key);
            return Ok((data, CacheStatus::Hit));
        }

        let flight = self.join_flight(key);
        let _turn = flight.lock.lock().await;

        if let Some(data) = self.read_entry(key).await? {
            self.record(true, key);
            return Ok((data, CacheStatus::Hit));
        }
        self.record(false, key);

        let data = fetch().await?;
        self.put(key, &data).await?;
        Ok((data, CacheStatus::Miss))
    }

    fn join_flight(&self, key: &str) -> Flight<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        let slot = in_flight.entry(key.to_string()).or_default();
        slot.members += 1;
        let lock = Arc::clone(&slot.lock);
        Flight {
            cache: self,
            key: key.to_string(),
            lock,
        }
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let index = self.index.read().await;
        CacheStats {
            entries: index.len(),
            total_size: index.total_size(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}

/// Lock shared by every caller working on one key
#[derive(Default)]
struct InFlight {
    lock: Arc<AsyncMutex<()>>,
    members: usize,
}

/// Membership in the set of callers working on one key
struct Flight<'a> {
    cache: &'a BlobCache,
    key: String,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .cache
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = in_flight.get_mut(&self.key) {
            slot.members = slot.members.saturating_sub(1);
            if slot.members == 0 {
                in_flight.remove(&self.key);
            }
        }
    }
}
