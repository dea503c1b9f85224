//! Cache abstraction layer for Folio.
//!
//! Two traits form the API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store with etag-based invalidation
//!
//! Implementations:
//!
//! - [`NullCache`]: Always misses, used when caching is disabled
//! - [`MemoryCache`]: Process-local, shared between handles
//! - [`FileCache`]: On disk below a root directory, wiped on version change
//!
//! Cache failures are never errors: a bucket that can't read or write an entry
//! behaves as a miss.
//!
//! # Example
//!
//! ```
//! use folio_cache::{Cache, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("pages");
//! bucket.set("docs/guide", "1700000000", b"{}");
//! assert_eq!(bucket.get("docs/guide", "1700000000"), Some(b"{}".to_vec()));
//! assert_eq!(bucket.get("docs/guide", "1700000001"), None);
//! ```

mod ext;
mod file;
mod memory;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// A hit requires both the key and the etag to match. The etag is chosen by
/// the caller, typically the source revision. An empty etag on
/// `get` matches any stored etag.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value, or `None` on miss or etag mismatch.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store a value, replacing any entry for `key`.
    fn set(&self, key: &str, etag: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
pub trait Cache: Send + Sync {
    /// Open or create the bucket `name` (e.g. "pages").
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`].
#[derive(Debug, Default)]
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] handing out [`NullCacheBucket`]s.
#[derive(Debug, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
