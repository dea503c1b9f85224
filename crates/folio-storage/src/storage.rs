//! Storage trait and error type.
//!
//! Paths passed to [`Storage`] methods are relative to the book root and use
//! `/` separators, e.g. `index.yaml` or `guide/setup.yaml`.

use std::path::{Path, PathBuf};

/// Error returned when a page source can't be accessed.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No source exists at the path.
    #[error("Page source not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Path leaves the book root.
    #[error("Page source path escapes the book root: {}", .0.display())]
    InvalidPath(PathBuf),
    /// Backend failure.
    #[error("Failed to access page source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Map an I/O error on `path`, folding `NotFound` into [`StorageError::NotFound`].
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::InvalidPath(path) | Self::Io { path, .. } => path,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Read access to the page sources of one book.
pub trait Storage: Send + Sync {
    /// Read a page source.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the source doesn't exist or can't be read.
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Whether a page source exists. Errors count as absent.
    fn exists(&self, path: &Path) -> bool;

    /// Opaque revision tag of a page source.
    ///
    /// The tag changes whenever the content may have changed; callers use it
    /// to validate cached parses.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the source doesn't exist.
    fn revision(&self, path: &Path) -> Result<String, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_folded() {
        let err = StorageError::io(
            "index.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Page source not found: index.yaml");
    }

    #[test]
    fn test_io_other_keeps_source() {
        let err = StorageError::io("a.yaml", std::io::Error::other("disk on fire"));

        assert!(!err.is_not_found());
        assert_eq!(err.path(), Path::new("a.yaml"));
        assert_eq!(
            err.to_string(),
            "Failed to access page source a.yaml: disk on fire"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_path_message() {
        let err = StorageError::InvalidPath(PathBuf::from("../x.yaml"));
        assert_eq!(
            err.to_string(),
            "Page source path escapes the book root: ../x.yaml"
        );
    }
}
