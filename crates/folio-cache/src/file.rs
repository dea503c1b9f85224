//! On-disk cache.
//!
//! Entries live in one directory per bucket; a key maps to a relative file
//! path below it, with an `.entry` suffix. Each entry file starts with the etag on its own line,
//! followed by the raw value:
//!
//! ```text
//! 1700000000.25\n
//! {"title":"Home",...}
//! ```
//!
//! A `VERSION` file in the root records the format version. When it is
//! missing or different, the whole root is wiped before use.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use crate::{Cache, CacheBucket};

/// Suffix of entry files, so key `a` and key `a/b` can coexist.
const ENTRY_EXTENSION: &str = ".entry";

/// [`Cache`] stored below a root directory.
///
/// ```text
/// {root}/
/// +-- VERSION
/// +-- pages/
///     +-- docs/guide/setup.yaml.entry
/// ```
#[derive(Debug)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root`, wiping it if it was written by another `version`.
    ///
    /// Failures are logged; a cache that can't be initialized just misses.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        if let Err(e) = ensure_version(&root, version) {
            tracing::warn!(root = %root.display(), error = %e, "Failed to initialize cache directory");
        }
        Self { root }
    }

    /// Like [`FileCache::new`], but fails when the root can't be initialized.
    ///
    /// # Errors
    ///
    /// Returns the I/O error that prevented creating the root or writing its
    /// `VERSION` file.
    pub fn open(root: PathBuf, version: &str) -> std::io::Result<Self> {
        ensure_version(&root, version)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    /// Entry path for `key`, or `None` if the key would leave the bucket.
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let mut path = self.dir.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => {
                    tracing::trace!(key, "Rejecting cache key");
                    return None;
                }
            }
        }
        if path == self.dir {
            return None;
        }
        let mut file = path.into_os_string();
        file.push(ENTRY_EXTENSION);
        Some(PathBuf::from(file))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key)?;
        let mut reader = BufReader::new(fs::File::open(&path).ok()?);

        let mut stored_etag = String::new();
        reader.read_line(&mut stored_etag).ok()?;
        let stored_etag = stored_etag.strip_suffix('\n')?;
        if !etag.is_empty() && stored_etag != etag {
            tracing::trace!(key, "Cache etag mismatch");
            return None;
        }

        let mut value = Vec::new();
        reader.read_to_end(&mut value).ok()?;
        Some(value)
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        if etag.contains('\n') {
            return;
        }
        let Some(path) = self.entry_path(key) else {
            return;
        };
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "Failed to create cache directory");
            return;
        }

        let mut contents = Vec::with_capacity(etag.len() + 1 + value.len());
        contents.extend_from_slice(etag.as_bytes());
        contents.push(b'\n');
        contents.extend_from_slice(value);

        // Write then rename so concurrent readers never see a partial entry
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        if let Err(e) = fs::write(&tmp, &contents).and_then(|()| fs::rename(&tmp, &path)) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write cache entry");
            let _ = fs::remove_file(&tmp);
        }
    }
}

fn ensure_version(root: &Path, version: &str) -> std::io::Result<()> {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!(root = %root.display(), version, "Cache version matches");
            return Ok(());
        }
        Ok(stored) => {
            tracing::info!(stored, version, "Cache version changed, wiping cache");
        }
        Err(_) => {
            tracing::debug!(root = %root.display(), "Initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!(error = %e, "Failed to remove cache directory");
    }
    fs::create_dir_all(root)?;
    fs::write(&version_file, version)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn cache(tmp: &TempDir) -> FileCache {
        FileCache::new(tmp.path().join("cache"), "1")
    }

    #[test]
    fn test_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let bucket = cache(&tmp).bucket("pages");

        bucket.set("docs/guide/setup", "17.5", b"{\"title\":\"Setup\"}");

        assert_eq!(
            bucket.get("docs/guide/setup", "17.5"),
            Some(b"{\"title\":\"Setup\"}".to_vec())
        );
        assert_eq!(bucket.get("docs/guide/setup", "18"), None);
        assert_eq!(
            bucket.get("docs/guide/setup", ""),
            Some(b"{\"title\":\"Setup\"}".to_vec())
        );
    }

    #[test]
    fn test_value_may_contain_newlines() {
        let tmp = TempDir::new().unwrap();
        let bucket = cache(&tmp).bucket("pages");

        bucket.set("k", "e", b"line one\nline two\n");

        assert_eq!(bucket.get("k", "e"), Some(b"line one\nline two\n".to_vec()));
    }

    #[test]
    fn test_keys_cannot_escape_bucket() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);
        let bucket = cache.bucket("pages");

        bucket.set("../escaped", "e", b"x");
        bucket.set("", "e", b"x");

        assert!(!cache.root().join("escaped").exists());
        assert_eq!(bucket.get("../escaped", "e"), None);
        assert_eq!(bucket.get("", "e"), None);
    }

    #[test]
    fn test_leading_slash_stays_in_bucket() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);
        let bucket = cache.bucket("pages");

        bucket.set("/docs/index", "e", b"x");

        assert!(cache.root().join("pages/docs/index.entry").is_file());
        assert_eq!(bucket.get("docs/index", "e"), Some(b"x".to_vec()));
    }

    #[test]
    fn test_key_may_prefix_another_key() {
        let tmp = TempDir::new().unwrap();
        let bucket = cache(&tmp).bucket("pages");

        bucket.set("docs/guide", "e", b"parent");
        bucket.set("docs/guide/setup", "e", b"child");

        assert_eq!(bucket.get("docs/guide", "e"), Some(b"parent".to_vec()));
        assert_eq!(bucket.get("docs/guide/setup", "e"), Some(b"child".to_vec()));
    }

    #[test]
    fn test_buckets_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);

        cache.bucket("alpha").set("k", "e", b"a");
        cache.bucket("beta").set("k", "e", b"b");

        assert_eq!(cache.bucket("alpha").get("k", "e"), Some(b"a".to_vec()));
        assert_eq!(cache.bucket("beta").get("k", "e"), Some(b"b".to_vec()));
    }

    #[test]
    fn test_same_version_keeps_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone(), "1").bucket("pages").set("k", "e", b"kept");

        let reopened = FileCache::new(root, "1");
        assert_eq!(reopened.bucket("pages").get("k", "e"), Some(b"kept".to_vec()));
    }

    #[test]
    fn test_version_change_wipes_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone(), "1").bucket("pages").set("k", "e", b"stale");

        let reopened = FileCache::new(root.clone(), "2");
        assert_eq!(reopened.bucket("pages").get("k", "e"), None);
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "2");
    }

    #[test]
    fn test_creates_missing_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("a/b/cache");

        let _cache = FileCache::new(root.clone(), "1");

        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "1");
    }

    #[test]
    fn test_open_reports_unusable_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        fs::write(&root, "not a directory").unwrap();

        assert!(FileCache::open(root.clone(), "1").is_err());

        let cache = FileCache::new(root, "1");
        cache.bucket("pages").set("k", "e", b"lost");
        assert_eq!(cache.bucket("pages").get("k", "e"), None);
    }

    #[test]
    fn test_open_initializes_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let cache = FileCache::open(root.clone(), "1").unwrap();

        assert_eq!(cache.root(), root.as_path());
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "1");
    }
}
