//! Site error types.

use std::path::PathBuf;

use folio_model::{DuplicateElementId, PageRef};
use folio_news::{CaptureError, NewsError};
use folio_storage::StorageError;

/// Error returned when a page can't be captured.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Page source could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Page source is not valid YAML for a page document.
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        /// Source path within the book.
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// Page source parsed but describes an invalid page.
    #[error("Invalid page {page}: {message}")]
    InvalidDocument {
        page: PageRef,
        message: String,
    },
    /// A news item on the page could not be resolved.
    #[error(transparent)]
    News(#[from] NewsError),
    /// Capturing a page required capturing itself.
    #[error("Capture cycle detected at {page}")]
    CaptureCycle {
        page: PageRef,
    },
    /// Page path is empty or leaves the book root.
    #[error("Invalid page path: {0}")]
    InvalidPath(String),
    /// Book is not registered or is disabled.
    #[error("Book not available: {0}")]
    UnknownBook(String),
    /// Capturing a linked page failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl SiteError {
    pub(crate) fn duplicate_id(page: &PageRef, err: &DuplicateElementId) -> Self {
        Self::InvalidDocument {
            page: page.clone(),
            message: err.to_string(),
        }
    }
}
