//! Book registry.
//!
//! [`Site`] knows which books exist, where their page sources live, and
//! caches parsed page documents across capture sessions. Pages themselves
//! are captured through a [`CaptureSession`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use folio_cache::{Cache, CacheBucket, CacheBucketExt, FileCache, MemoryCache, NullCache};
use folio_config::Config;
use folio_model::{BookName, DEFAULT_VIEW_NAME, PageRef};
use folio_news::feed::is_protected_extension;
use folio_news::join_path;
use folio_storage::{FsStorage, Storage};

use crate::document::{PageDocument, source_path};
use crate::error::SiteError;
use crate::session::CaptureSession;

/// A registered book.
struct Book {
    storage: Arc<dyn Storage>,
    domain: Option<String>,
    enabled: bool,
}

/// Registered books and their page sources.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use folio_cache::NullCache;
/// use folio_site::Site;
/// use folio_storage::FsStorage;
///
/// let site = Site::new(&NullCache).with_book("docs", Arc::new(FsStorage::new("docs".into())));
/// let session = site.session();
/// let news = session.news(&site.page_ref("docs", "/")?)?;
/// ```
pub struct Site {
    books: HashMap<BookName, Book>,
    pages: Box<dyn CacheBucket>,
    default_view: String,
}

impl Site {
    /// Create a site with no books, caching parsed documents in `cache`.
    #[must_use]
    pub fn new(cache: &dyn Cache) -> Self {
        Self {
            books: HashMap::new(),
            pages: cache.bucket("pages"),
            default_view: DEFAULT_VIEW_NAME.to_owned(),
        }
    }

    /// Create a site from configuration, with filesystem storage per book.
    ///
    /// `version` invalidates the on-disk cache when it changes. When the
    /// cache directory can't be used, documents are cached in memory for the
    /// life of the site instead.
    #[must_use]
    pub fn from_config(config: &Config, version: &str) -> Self {
        let cache: Box<dyn Cache> = if config.cache.enabled {
            match FileCache::open(config.cache.dir.clone(), version) {
                Ok(cache) => Box::new(cache),
                Err(e) => {
                    tracing::warn!(
                        dir = %config.cache.dir.display(),
                        error = %e,
                        "Cache directory unusable, caching in memory"
                    );
                    Box::new(MemoryCache::new())
                }
            }
        } else {
            Box::new(NullCache)
        };

        let mut site = Self::new(cache.as_ref()).with_default_view(&config.site.default_view);
        for book in &config.books {
            site = site.with_book_config(
                &book.name,
                Arc::new(FsStorage::new(book.source_dir.clone())),
                book.domain.clone(),
                book.enabled,
            );
        }
        site
    }

    /// Register an enabled book without a domain.
    #[must_use]
    pub fn with_book(self, name: &str, storage: Arc<dyn Storage>) -> Self {
        self.with_book_config(name, storage, None, true)
    }

    /// Register a book.
    ///
    /// A disabled book stays known by name, but references into it behave
    /// as references into a missing book.
    #[must_use]
    pub fn with_book_config(
        mut self,
        name: &str,
        storage: Arc<dyn Storage>,
        domain: Option<String>,
        enabled: bool,
    ) -> Self {
        self.books.insert(
            BookName::new(name),
            Book {
                storage,
                domain,
                enabled,
            },
        );
        self
    }

    /// View assigned to news items that name none.
    #[must_use]
    pub fn with_default_view(mut self, view: &str) -> Self {
        view.clone_into(&mut self.default_view);
        self
    }

    #[must_use]
    pub fn default_view(&self) -> &str {
        &self.default_view
    }

    /// Start a capture session.
    #[must_use]
    pub fn session(&self) -> CaptureSession<'_> {
        CaptureSession::new(self)
    }

    /// Reference to page `path` in the enabled book `book`.
    ///
    /// `path` is taken relative to the book root.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::UnknownBook`] if the book is not available and
    /// [`SiteError::InvalidPath`] if the path is empty or leaves the book.
    pub fn page_ref(&self, book: &str, path: &str) -> Result<PageRef, SiteError> {
        let name = BookName::new(book);
        if !self.is_available(&name) {
            return Err(SiteError::UnknownBook(book.to_owned()));
        }
        let path = join_path("/", path).ok_or_else(|| SiteError::InvalidPath(path.to_owned()))?;
        Ok(PageRef::new(name, path))
    }

    /// Whether `book` is registered and enabled.
    pub(crate) fn is_available(&self, book: &BookName) -> bool {
        self.books.get(book).is_some_and(|b| b.enabled)
    }

    /// Whether `book` is available and published under `domain`, if one is given.
    pub(crate) fn is_available_in(&self, domain: Option<&str>, book: &BookName) -> bool {
        match self.books.get(book) {
            Some(b) if b.enabled => domain.is_none_or(|d| b.domain.as_deref() == Some(d)),
            _ => false,
        }
    }

    /// Load and parse the source of `page_ref`, through the document cache.
    ///
    /// Fragment sources (`.inc.yaml` and friends) are never pages.
    pub(crate) fn load_document(&self, page_ref: &PageRef) -> Result<PageDocument, SiteError> {
        let book_name = page_ref
            .book()
            .ok_or_else(|| SiteError::UnknownBook(page_ref.book_name().to_string()))?;
        let book = self
            .books
            .get(book_name)
            .filter(|b| b.enabled)
            .ok_or_else(|| SiteError::UnknownBook(book_name.to_string()))?;

        let path = source_path(page_ref.path());
        if is_protected_extension(&path.to_string_lossy()) {
            return Err(SiteError::InvalidPath(page_ref.to_string()));
        }
        let key = cache_key(book_name, &path);
        let etag = book.storage.revision(&path)?;

        if let Some(doc) = self.pages.get_json::<PageDocument>(&key, &etag) {
            tracing::trace!(page = %page_ref, "Document cache hit");
            return Ok(doc);
        }

        let source = book.storage.read(&path)?;
        let doc = PageDocument::parse(&source).map_err(|source| SiteError::Parse {
            path: path.clone(),
            source,
        })?;
        if doc.title.trim().is_empty() {
            return Err(SiteError::InvalidDocument {
                page: page_ref.clone(),
                message: "title cannot be empty".to_owned(),
            });
        }

        self.pages.set_json(&key, &etag, &doc);
        Ok(doc)
    }
}

fn cache_key(book: &BookName, path: &Path) -> String {
    format!("{book}/{}", path.display())
}
