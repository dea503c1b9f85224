//! In-process cache.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Cache, CacheBucket};

type Entries = HashMap<(String, String), (String, Vec<u8>)>;

/// [`Cache`] held in memory.
///
/// Clones and buckets opened with the same name share entries, so a cache
/// created once can serve many capture sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all buckets.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            entries: Arc::clone(&self.entries),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    entries: Arc<RwLock<Entries>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().unwrap();
        let (stored_etag, value) = entries.get(&(self.name.clone(), key.to_owned()))?;
        (etag.is_empty() || stored_etag == etag).then(|| value.clone())
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        self.entries.write().unwrap().insert(
            (self.name.clone(), key.to_owned()),
            (etag.to_owned(), value.to_vec()),
        );
    }
}
