//! Error types for news resolution and collection.

use folio_model::PageRef;

/// Error returned when a news reference can't be resolved.
///
/// Every variant is fatal to the page being captured: a broken explicit
/// reference is an authoring error and must surface. References into a
/// missing book are not errors; they resolve to a placeholder title.
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    /// Malformed book/page combination or path.
    #[error("Invalid reference on {page}: {message}")]
    InvalidReference {
        /// Page holding the offending reference.
        page: PageRef,
        /// What is wrong with the reference.
        message: String,
    },
    /// Element reference to the page being captured, for an element not yet captured.
    #[error("Forward reference to element in same page not supported: {page}#{element}")]
    UnsupportedForwardReference {
        /// Page being captured.
        page: PageRef,
        /// Requested element id.
        element: String,
    },
    /// Element id absent from the target page.
    #[error("Element not found in target page {page}: {element}")]
    ElementNotFound {
        /// Target page.
        page: PageRef,
        /// Requested element id.
        element: String,
    },
    /// Element id was generated by the capture layer and is not a stable target.
    #[error(
        "Not allowed to link to a generated element id, set an explicit id on the target element: {page}#{element}"
    )]
    GeneratedIdNotAllowed {
        /// Target page.
        page: PageRef,
        /// Requested element id.
        element: String,
    },
    /// Target element has no label to title the reference with.
    #[error("Target element has an empty label: {page}#{element}")]
    InvariantViolation {
        /// Target page.
        page: PageRef,
        /// Target element id.
        element: String,
    },
    /// Capturing the target page failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl NewsError {
    /// Create an invalid reference error for a reference on `page`.
    #[must_use]
    pub fn invalid_reference(page: &PageRef, message: impl Into<String>) -> Self {
        Self::InvalidReference {
            page: page.clone(),
            message: message.into(),
        }
    }
}

/// Error returned by a page capture provider.
///
/// Carries the page that failed and the provider's own error unchanged;
/// use [`CaptureError::downcast_source`] to inspect it.
#[derive(Debug, thiserror::Error)]
#[error("Failed to capture {page}: {source}")]
pub struct CaptureError {
    page: PageRef,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl CaptureError {
    /// Wrap a provider error for `page`.
    #[must_use]
    pub fn new(page: PageRef, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            page,
            source: source.into(),
        }
    }

    /// Page whose capture failed.
    #[must_use]
    pub fn page(&self) -> &PageRef {
        &self.page
    }

    /// Downcast the provider error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref()
    }
}

#[cfg(test)]
mod tests {
    use folio_model::BookName;

    use super::*;

    #[test]
    fn test_invalid_reference_message() {
        let page = PageRef::new(BookName::new("docs"), "/news");
        let err = NewsError::invalid_reference(&page, "page required when book provided");
        assert_eq!(
            err.to_string(),
            "Invalid reference on docs:/news: page required when book provided"
        );
    }

    #[test]
    fn test_capture_error_keeps_source() {
        let page = PageRef::new(BookName::new("docs"), "/broken");
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = CaptureError::new(page.clone(), io);

        assert_eq!(err.page(), &page);
        assert_eq!(err.to_string(), "Failed to capture docs:/broken: gone");
        let source = err.downcast_source::<std::io::Error>().unwrap();
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }
}
