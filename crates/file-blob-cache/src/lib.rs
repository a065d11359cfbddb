//! File-backed blob cache with TTL expiration
//!
//! Stores binary blobs on disk under generated identifiers and keeps an
//! in-memory index from request keys to blobs. Expired entries are removed
//! by an explicit sweep, either per request or on a background interval.

mod cache;
mod clock;
mod error;
mod index;
mod store;
mod types;

pub use cache::{BlobCache, DEFAULT_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BlobCacheError, Result};
pub use index::CacheIndex;
pub use store::BlobStore;
pub use types::{BlobId, CacheEntry, CacheStats, CacheStatus};
