//! In-memory host for testing.
//!
//! Provides [`MockHost`], implementing every host trait over pages built in
//! the test itself.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use folio_model::{BookName, CaptureLevel, ElementId, Page, PageRef};

use crate::error::{CaptureError, NewsError};
use crate::host::{NodeRef, PageCapture, PageLinkRecorder, PageRefResolver, TargetRef, join_path};

/// Mock host for testing.
///
/// Serves pages registered with [`MockHost::with_page`] whatever level is
/// requested, and records every capture request and page link so tests can
/// assert on them.
///
/// # Example
///
/// ```ignore
/// use folio_news::{MockHost, collect_news};
///
/// let host = MockHost::new().with_book("docs").with_page(child_page);
/// let news = collect_news(&host, &root_page)?;
/// assert_eq!(host.capture_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockHost {
    books: RwLock<HashSet<BookName>>,
    inaccessible: RwLock<HashSet<BookName>>,
    pages: RwLock<HashMap<PageRef, Arc<Page>>>,
    failing: RwLock<HashSet<PageRef>>,
    captures: Mutex<Vec<(PageRef, CaptureLevel)>>,
    links: Mutex<Vec<(PageRef, Option<ElementId>, PageRef)>>,
}

impl MockHost {
    /// Create a host with no books.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accessible book.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_book(self, name: &str) -> Self {
        self.books.write().unwrap().insert(BookName::new(name));
        self
    }

    /// Register a book whose pages may not be captured.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_inaccessible_book(self, name: &str) -> Self {
        let book = BookName::new(name);
        self.books.write().unwrap().insert(book.clone());
        self.inaccessible.write().unwrap().insert(book);
        self
    }

    /// Add a captured page, keyed by its own reference.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, page: Page) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(page.page_ref().clone(), Arc::new(page));
        self
    }

    /// Make captures of `page_ref` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_page(self, page_ref: PageRef) -> Self {
        self.failing.write().unwrap().insert(page_ref);
        self
    }

    /// Capture requests received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn captures(&self) -> Vec<(PageRef, CaptureLevel)> {
        self.captures.lock().unwrap().clone()
    }

    /// Number of capture requests received so far.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.captures().len()
    }

    /// Page links recorded so far as `(from page, from element, target)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn recorded_links(&self) -> Vec<(PageRef, Option<ElementId>, PageRef)> {
        self.links.lock().unwrap().clone()
    }

    fn is_registered(&self, book: &BookName) -> bool {
        self.books.read().unwrap().contains(book)
    }
}

impl PageRefResolver for MockHost {
    fn resolve_page_ref(
        &self,
        context: &PageRef,
        target: &TargetRef<'_>,
    ) -> Result<PageRef, NewsError> {
        let book = target
            .book
            .map_or_else(|| context.book_name().clone(), BookName::new);
        let base = if target.book.is_some() {
            "/"
        } else {
            context.directory()
        };
        let path = join_path(base, target.path).ok_or_else(|| {
            NewsError::invalid_reference(context, format!("invalid path: {}", target.path))
        })?;
        if self.is_registered(&book) {
            Ok(PageRef::new(book, path))
        } else {
            Ok(PageRef::missing(book, path))
        }
    }
}

impl PageCapture for MockHost {
    fn capture_page(
        &self,
        page_ref: &PageRef,
        level: CaptureLevel,
    ) -> Result<Option<Arc<Page>>, CaptureError> {
        self.captures
            .lock()
            .unwrap()
            .push((page_ref.clone(), level));

        let Some(book) = page_ref.book() else {
            return Ok(None);
        };
        if !self.is_registered(book) {
            return Ok(None);
        }
        if self.failing.read().unwrap().contains(page_ref) {
            return Err(CaptureError::new(
                page_ref.clone(),
                std::io::Error::other("capture failed"),
            ));
        }
        match self.pages.read().unwrap().get(page_ref) {
            Some(page) => Ok(Some(Arc::clone(page))),
            None => Err(CaptureError::new(
                page_ref.clone(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "page not found"),
            )),
        }
    }

    fn is_book_accessible(&self, book: &BookName) -> bool {
        self.is_registered(book) && !self.inaccessible.read().unwrap().contains(book)
    }
}

impl PageLinkRecorder for MockHost {
    fn record_page_link(&self, from: &NodeRef<'_>, target: &PageRef) {
        let element = match from {
            NodeRef::Page(_) => None,
            NodeRef::Element { id, .. } => Some((*id).clone()),
        };
        self.links
            .lock()
            .unwrap()
            .push((from.page().clone(), element, target.clone()));
    }
}
