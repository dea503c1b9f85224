//! In-memory book sources for tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Storage, StorageError};

#[derive(Debug)]
struct MockSource {
    content: String,
    revision: u64,
    reads: usize,
}

/// In-memory [`Storage`].
///
/// Every [`MockStorage::set_file`] bumps the source's revision, so replacing
/// a source after it has been cached is visible to callers.
///
/// ```
/// use std::path::Path;
/// use folio_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new().with_file("index.yaml", "title: Home\n");
/// assert_eq!(storage.read(Path::new("index.yaml")).unwrap(), "title: Home\n");
/// assert_eq!(storage.read_count("index.yaml"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    sources: RwLock<HashMap<PathBuf, MockSource>>,
}

impl MockStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add or replace a source, bumping its revision.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let mut sources = self.sources.write().unwrap();
        let source = sources.entry(path.into()).or_insert(MockSource {
            content: String::new(),
            revision: 0,
            reads: 0,
        });
        source.content = content.into();
        source.revision += 1;
    }

    /// Number of successful reads of `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        self.sources
            .read()
            .unwrap()
            .get(path.as_ref())
            .map_or(0, |source| source.reads)
    }
}

impl Storage for MockStorage {
    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let mut sources = self.sources.write().unwrap();
        let source = sources
            .get_mut(path)
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))?;
        source.reads += 1;
        Ok(source.content.clone())
    }

    fn exists(&self, path: &Path) -> bool {
        self.sources.read().unwrap().contains_key(path)
    }

    fn revision(&self, path: &Path) -> Result<String, StorageError> {
        self.sources
            .read()
            .unwrap()
            .get(path)
            .map(|source| source.revision.to_string())
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }
}
