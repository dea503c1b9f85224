//! Host collaborators used by the resolver and the collector.
//!
//! The news core never loads pages itself. A host supplies:
//! - [`PageRefResolver`]: Turns authored book/path strings into a [`PageRef`]
//! - [`PageCapture`]: Captures pages at a requested [`CaptureLevel`]
//! - [`LinkFormatter`]: Placeholder text for broken references and anchor scoping
//! - [`PageLinkRecorder`]: Backlink bookkeeping

use std::sync::Arc;

use folio_model::{BookName, CaptureLevel, ElementId, Page, PageRef};

use crate::error::{CaptureError, NewsError};

/// Authored target of a reference, before resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetRef<'a> {
    /// Domain qualifying the book.
    pub domain: Option<&'a str>,
    /// Book name; `None` means the book of the context page.
    pub book: Option<&'a str>,
    /// Absolute or context-relative path.
    pub path: &'a str,
}

/// Resolves authored references to page identifiers.
pub trait PageRefResolver {
    /// Resolve `target` as written on the page `context`.
    ///
    /// A book that is not registered yields a [`PageRef`] with a missing book
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::InvalidReference`] for malformed paths.
    fn resolve_page_ref(&self, context: &PageRef, target: &TargetRef<'_>)
    -> Result<PageRef, NewsError>;
}

/// Captures pages.
///
/// Implementations are expected to memoize: repeated requests for the same
/// page and level within one session should not capture twice.
pub trait PageCapture {
    /// Capture `page_ref` at `level` or deeper.
    ///
    /// Returns `Ok(None)` when the page's book is missing.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] when the page exists but can't be captured.
    fn capture_page(
        &self,
        page_ref: &PageRef,
        level: CaptureLevel,
    ) -> Result<Option<Arc<Page>>, CaptureError>;

    /// Whether pages of `book` may be captured.
    fn is_book_accessible(&self, book: &BookName) -> bool;
}

/// Formats link text and anchor ids.
pub trait LinkFormatter {
    /// Placeholder text for a reference whose target can't be captured.
    fn format_broken_reference(&self, page_ref: &PageRef, element: Option<&str>) -> String {
        broken_reference(page_ref, element)
    }

    /// Anchor id for `raw_id`, unique within the rendering of `page`.
    fn scoped_anchor_id(&self, page: &Page, raw_id: &str) -> String {
        let _ = page;
        raw_id.to_owned()
    }
}

/// Node a page link originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRef<'a> {
    /// The page itself.
    Page(&'a PageRef),
    /// An element of the page.
    Element {
        /// Page holding the element.
        page: &'a PageRef,
        /// Element id.
        id: &'a ElementId,
    },
}

impl NodeRef<'_> {
    /// Page the node belongs to.
    #[must_use]
    pub fn page(&self) -> &PageRef {
        match self {
            Self::Page(page) | Self::Element { page, .. } => page,
        }
    }
}

/// Receives "links to" facts as references are resolved.
pub trait PageLinkRecorder {
    fn record_page_link(&self, from: &NodeRef<'_>, target: &PageRef);
}

/// [`LinkFormatter`] using the default formats.
#[derive(Debug, Default)]
pub struct DefaultLinkFormatter;

impl LinkFormatter for DefaultLinkFormatter {}

/// [`PageLinkRecorder`] that discards every link.
#[derive(Debug, Default)]
pub struct NoopLinkRecorder;

impl PageLinkRecorder for NoopLinkRecorder {
    fn record_page_link(&self, _from: &NodeRef<'_>, _target: &PageRef) {}
}

/// Default placeholder for an unresolvable reference.
///
/// ```
/// use folio_model::{BookName, PageRef};
/// use folio_news::broken_reference;
///
/// let target = PageRef::missing(BookName::new("archive"), "/2019");
/// assert_eq!(broken_reference(&target, None), "¿archive:/2019¿");
/// assert_eq!(broken_reference(&target, Some("intro")), "¿archive:/2019#intro¿");
/// ```
#[must_use]
pub fn broken_reference(page_ref: &PageRef, element: Option<&str>) -> String {
    match element {
        Some(element) => format!("¿{page_ref}#{element}¿"),
        None => format!("¿{page_ref}¿"),
    }
}

/// Resolve `path` against the directory `base_dir` (which ends in `/`).
///
/// Absolute paths ignore `base_dir`. `.` and `..` segments are folded and a
/// trailing slash is kept. Returns `None` for an empty path or one that
/// climbs above the book root.
///
/// ```
/// use folio_news::join_path;
///
/// assert_eq!(join_path("/guide/", "setup").as_deref(), Some("/guide/setup"));
/// assert_eq!(join_path("/guide/", "../about").as_deref(), Some("/about"));
/// assert_eq!(join_path("/guide/", "/news/").as_deref(), Some("/news/"));
/// assert_eq!(join_path("/", "../escape"), None);
/// ```
#[must_use]
pub fn join_path(base_dir: &str, path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let combined = if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("{base_dir}{path}")
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in combined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    let mut resolved = String::from("/");
    resolved.push_str(&segments.join("/"));
    if !segments.is_empty() && (combined.ends_with('/') || combined.ends_with("/.")) {
        resolved.push('/');
    }
    Some(resolved)
}
