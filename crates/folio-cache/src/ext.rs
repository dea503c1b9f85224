//! Typed access to [`CacheBucket`] values.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// JSON convenience methods for every [`CacheBucket`].
///
/// Kept off [`CacheBucket`] itself so the bucket trait stays object-safe.
///
/// # Example
///
/// ```
/// use folio_cache::{Cache, CacheBucketExt, MemoryCache};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Doc { title: String }
///
/// let bucket = MemoryCache::new().bucket("pages");
/// bucket.set_json("docs/", "1", &Doc { title: "Home".into() });
/// let doc: Option<Doc> = bucket.get_json("docs/", "1");
/// assert_eq!(doc, Some(Doc { title: "Home".into() }));
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a JSON value; a value that no longer deserializes is a miss.
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Store a value as JSON. Serialization failures are logged and dropped.
    fn set_json<T: Serialize>(&self, key: &str, etag: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, etag, &bytes),
            Err(e) => tracing::warn!(key, error = %e, "Failed to serialize cache entry"),
        }
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{Cache, MemoryCache};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        title: String,
        children: Vec<String>,
    }

    #[test]
    fn test_json_hit_and_etag_miss() {
        let bucket = MemoryCache::new().bucket("pages");
        let entry = Entry {
            title: "Home".to_owned(),
            children: vec!["/guide".to_owned()],
        };

        bucket.set_json("docs/", "1", &entry);

        assert_eq!(bucket.get_json::<Entry>("docs/", "1"), Some(entry));
        assert_eq!(bucket.get_json::<Entry>("docs/", "2"), None);
    }

    #[test]
    fn test_undecodable_entry_is_miss() {
        let bucket = MemoryCache::new().bucket("pages");
        bucket.set("docs/", "1", b"not json");

        assert_eq!(bucket.get_json::<Entry>("docs/", "1"), None);
    }

    #[test]
    fn test_works_through_trait_object() {
        let bucket: Box<dyn CacheBucket> = MemoryCache::new().bucket("pages");
        bucket.set_json("k", "e", &vec![1, 2, 3]);
        assert_eq!(bucket.get_json::<Vec<i32>>("k", "e"), Some(vec![1, 2, 3]));
    }
}
