//! Book sources stored in a local directory.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::storage::{Storage, StorageError};

/// Reads page sources below a book's `source_dir`.
///
/// Revisions combine modification time and size, so an edit that keeps the
/// mtime (coarse filesystems) but changes length still invalidates caches.
#[derive(Debug)]
pub struct FsStorage {
    source_dir: PathBuf,
}

impl FsStorage {
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Join `path` onto the book root, refusing anything but plain segments.
    fn full_path(&self, path: &Path) -> Result<PathBuf, StorageError> {
        if path.components().all(|c| matches!(c, Component::Normal(_))) {
            Ok(self.source_dir.join(path))
        } else {
            Err(StorageError::InvalidPath(path.to_path_buf()))
        }
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let full_path = self.full_path(path)?;
        tracing::trace!(path = %full_path.display(), "Reading page source");
        fs::read_to_string(&full_path).map_err(|e| StorageError::io(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        self.full_path(path).is_ok_and(|p| p.is_file())
    }

    fn revision(&self, path: &Path) -> Result<String, StorageError> {
        let full_path = self.full_path(path)?;
        let metadata = fs::metadata(&full_path).map_err(|e| StorageError::io(path, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| StorageError::io(path, e))?
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Ok(format!(
            "{}.{:09}-{}",
            modified.as_secs(),
            modified.subsec_nanos(),
            metadata.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(FsStorage: Send, Sync);

    fn book() -> (tempfile::TempDir, FsStorage) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("index.yaml"), "title: Home\n").unwrap();
        fs::write(dir.path().join("guide/setup.yaml"), "title: Setup\n").unwrap();
        let storage = FsStorage::new(dir.path().to_path_buf());
        (dir, storage)
    }

    #[test]
    fn test_read_sources() {
        let (_dir, storage) = book();

        assert_eq!(storage.read(Path::new("index.yaml")).unwrap(), "title: Home\n");
        assert_eq!(
            storage.read(Path::new("guide/setup.yaml")).unwrap(),
            "title: Setup\n"
        );
    }

    #[test]
    fn test_missing_source() {
        let (_dir, storage) = book();

        let err = storage.read(Path::new("nope.yaml")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), Path::new("nope.yaml"));
        assert!(storage.revision(Path::new("nope.yaml")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_exists_only_for_files() {
        let (_dir, storage) = book();

        assert!(storage.exists(Path::new("index.yaml")));
        assert!(!storage.exists(Path::new("guide")));
        assert!(!storage.exists(Path::new("missing.yaml")));
    }

    #[test]
    fn test_revision_tracks_size() {
        let (dir, storage) = book();

        let before = storage.revision(Path::new("index.yaml")).unwrap();
        assert!(before.ends_with("-12"));
        fs::write(dir.path().join("index.yaml"), "title: Welcome home\n").unwrap();
        let after = storage.revision(Path::new("index.yaml")).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_paths_confined_to_book() {
        let (_dir, storage) = book();

        for path in ["../etc/passwd", "guide/../../x.yaml", "/etc/passwd", "./index.yaml"] {
            let err = storage.read(Path::new(path)).unwrap_err();
            assert!(matches!(err, StorageError::InvalidPath(_)), "{path}");
            assert!(!storage.exists(Path::new(path)));
        }
        assert!(matches!(
            storage.revision(Path::new("../x")),
            Err(StorageError::InvalidPath(_))
        ));
    }
}
