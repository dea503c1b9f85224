//! Request-scoped page capture.
//!
//! A [`CaptureSession`] captures pages of a [`Site`] and memoizes every
//! capture for its lifetime. It is the host for news resolution and
//! collection: it implements every trait in [`folio_news::host`].
//!
//! # Thread Safety
//!
//! Locks guard only the session's bookkeeping and are never held while a
//! page is being captured. A capture in progress belongs to the thread
//! running it; other threads asking for the same page and level wait for
//! it instead of capturing again. Waiting that would close a loop of
//! threads is reported as a capture cycle.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread::{self, ThreadId};

use folio_model::{BookName, CaptureLevel, News, Page, PageRef};
use folio_news::{
    CaptureError, LinkFormatter, NewsError, NodeRef, PageCapture, PageLinkRecorder,
    PageRefResolver, TargetRef, collect_news, join_path,
};

use crate::capture::PageCapturer;
use crate::error::SiteError;
use crate::site::Site;

type CaptureKey = (PageRef, CaptureLevel);

/// Captures running right now, and what each blocked thread waits for.
#[derive(Default)]
struct InProgress {
    owners: HashMap<CaptureKey, ThreadId>,
    waiting: HashMap<ThreadId, CaptureKey>,
}

impl InProgress {
    /// Whether `me` waiting for `key` would wait on itself, directly or
    /// through a chain of blocked threads.
    fn closes_loop(&self, me: ThreadId, key: &CaptureKey) -> bool {
        let mut owner = self.owners.get(key);
        for _ in 0..=self.waiting.len() {
            match owner {
                None => return false,
                Some(&thread) if thread == me => return true,
                Some(thread) => {
                    owner = self.waiting.get(thread).and_then(|k| self.owners.get(k));
                }
            }
        }
        false
    }
}

/// Memoizing page capture over a [`Site`].
pub struct CaptureSession<'a> {
    site: &'a Site,
    captured: RwLock<HashMap<CaptureKey, Arc<Page>>>,
    in_progress: Mutex<InProgress>,
    finished: Condvar,
    backlinks: Mutex<BTreeMap<PageRef, BTreeSet<PageRef>>>,
}

impl<'a> CaptureSession<'a> {
    pub(crate) fn new(site: &'a Site) -> Self {
        Self {
            site,
            captured: RwLock::new(HashMap::new()),
            in_progress: Mutex::new(InProgress::default()),
            finished: Condvar::new(),
            backlinks: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn site(&self) -> &'a Site {
        self.site
    }

    /// Capture `page_ref` at `level` or deeper.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::UnknownBook`] when the page's book is missing,
    /// otherwise the error that stopped the capture.
    pub fn capture(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Arc<Page>, SiteError> {
        match self.capture_page(page_ref, level) {
            Ok(Some(page)) => Ok(page),
            Ok(None) => Err(SiteError::UnknownBook(page_ref.book_name().to_string())),
            Err(e) => Err(SiteError::Capture(e)),
        }
    }

    /// All news reachable from `page_ref`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns the first capture error met while walking the page graph.
    pub fn news(&self, page_ref: &PageRef) -> Result<Vec<News>, SiteError> {
        let root = self.capture(page_ref, CaptureLevel::Meta)?;
        Ok(collect_news(self, &root)?)
    }

    /// Pages whose news link to `target`, among pages captured so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn linking_pages(&self, target: &PageRef) -> Vec<PageRef> {
        self.backlinks
            .lock()
            .unwrap()
            .get(target)
            .map(|pages| pages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of distinct captures performed.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.captured.read().unwrap().len()
    }

    /// Memoized capture of `page_ref` at `level` or any deeper level.
    fn memoized(&self, page_ref: &PageRef, level: CaptureLevel) -> Option<Arc<Page>> {
        let captured = self.captured.read().unwrap();
        [CaptureLevel::Body, CaptureLevel::Meta, CaptureLevel::Page]
            .into_iter()
            .filter(|l| *l >= level)
            .find_map(|l| captured.get(&(page_ref.clone(), l)).cloned())
    }

    /// Capture `page_ref` unless another thread already is, in which case
    /// wait for its result.
    ///
    /// Lock order is `in_progress`, then `captured`.
    fn capture_uncached(
        &self,
        page_ref: &PageRef,
        level: CaptureLevel,
    ) -> Result<Arc<Page>, SiteError> {
        let key = (page_ref.clone(), level);
        let me = thread::current().id();

        let mut in_progress = self.in_progress.lock().unwrap();
        loop {
            if let Some(page) = self.memoized(page_ref, level) {
                return Ok(page);
            }
            if !in_progress.owners.contains_key(&key) {
                break;
            }
            if in_progress.closes_loop(me, &key) {
                return Err(SiteError::CaptureCycle {
                    page: page_ref.clone(),
                });
            }
            tracing::trace!(page = %page_ref, ?level, "Waiting for capture on another thread");
            in_progress.waiting.insert(me, key.clone());
            in_progress = self.finished.wait(in_progress).unwrap();
            in_progress.waiting.remove(&me);
        }
        in_progress.owners.insert(key.clone(), me);
        drop(in_progress);

        tracing::debug!(page = %page_ref, ?level, "Capturing page");
        let result = PageCapturer::new(self).capture(page_ref, level).map(Arc::new);

        let mut in_progress = self.in_progress.lock().unwrap();
        if let Ok(page) = &result {
            self.captured
                .write()
                .unwrap()
                .insert(key.clone(), Arc::clone(page));
        }
        in_progress.owners.remove(&key);
        drop(in_progress);
        self.finished.notify_all();

        result
    }
}

impl PageCapture for CaptureSession<'_> {
    fn capture_page(
        &self,
        page_ref: &PageRef,
        level: CaptureLevel,
    ) -> Result<Option<Arc<Page>>, CaptureError> {
        let Some(book) = page_ref.book() else {
            return Ok(None);
        };
        if !self.site.is_available(book) {
            return Ok(None);
        }
        if let Some(page) = self.memoized(page_ref, level) {
            tracing::trace!(page = %page_ref, ?level, "Capture cache hit");
            return Ok(Some(page));
        }
        self.capture_uncached(page_ref, level)
            .map(Some)
            .map_err(|e| CaptureError::new(page_ref.clone(), e))
    }

    fn is_book_accessible(&self, book: &BookName) -> bool {
        self.site.is_available(book)
    }
}

impl PageRefResolver for CaptureSession<'_> {
    fn resolve_page_ref(
        &self,
        context: &PageRef,
        target: &TargetRef<'_>,
    ) -> Result<PageRef, NewsError> {
        let (book, base) = match target.book {
            Some(book) => (BookName::new(book), "/"),
            None => (context.book_name().clone(), context.directory()),
        };
        let path = join_path(base, target.path).ok_or_else(|| {
            NewsError::invalid_reference(context, format!("invalid page path: {}", target.path))
        })?;

        if self.site.is_available_in(target.domain, &book) {
            Ok(PageRef::new(book, path))
        } else {
            Ok(PageRef::missing(book, path))
        }
    }
}

impl LinkFormatter for CaptureSession<'_> {}

impl PageLinkRecorder for CaptureSession<'_> {
    fn record_page_link(&self, from: &NodeRef<'_>, target: &PageRef) {
        self.backlinks
            .lock()
            .unwrap()
            .entry(target.clone())
            .or_default()
            .insert(from.page().clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use folio_cache::NullCache;
    use folio_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(CaptureSession<'static>: Send, Sync);

    fn docs(path: &str) -> PageRef {
        PageRef::new(BookName::new("docs"), path)
    }

    fn key(path: &str) -> CaptureKey {
        (docs(path), CaptureLevel::Meta)
    }

    #[test]
    fn test_concurrent_captures_share_one_result() {
        let storage = Arc::new(MockStorage::new().with_file(
            "hub.yaml",
            "title: Hub\nelements:\n  - kind: section\n    id: top\n    label: Top\n",
        ));
        let site = Site::new(&NullCache).with_book("docs", storage.clone());
        let session = &site.session();
        let barrier = &Barrier::new(4);

        let pages: Vec<Arc<Page>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(move || {
                        barrier.wait();
                        session.capture(&docs("/hub"), CaptureLevel::Meta)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap().unwrap())
                .collect()
        });

        assert!(pages.iter().all(|page| Arc::ptr_eq(page, &pages[0])));
        assert_eq!(session.capture_count(), 1);
        assert_eq!(storage.read_count("hub.yaml"), 1);
    }

    #[test]
    fn test_loop_detected_only_through_own_thread() {
        let me = thread::current().id();
        let other = thread::scope(|scope| scope.spawn(|| thread::current().id()).join().unwrap());
        let mut progress = InProgress::default();

        assert!(!progress.closes_loop(me, &key("/a")));

        progress.owners.insert(key("/a"), me);
        assert!(progress.closes_loop(me, &key("/a")));

        // `other` owns /b and waits for /a, owned by us: waiting for /b loops.
        progress.owners.insert(key("/b"), other);
        progress.waiting.insert(other, key("/a"));
        assert!(progress.closes_loop(me, &key("/b")));

        // Once `other` stops waiting, /b is just busy.
        progress.waiting.remove(&other);
        assert!(!progress.closes_loop(me, &key("/b")));
    }
}
