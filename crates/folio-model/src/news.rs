//! News items.
//!
//! A news item starts life as a [`NewsDraft`], the authored attributes exactly
//! as written. Resolution turns a draft into a [`ResolvedNews`] value, and the
//! capture layer stores both together as a [`News`] element of the page.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};

use crate::element::ElementId;
use crate::page_ref::{BookName, PageRef};

/// View a news item is exposed under unless it names another one.
pub const DEFAULT_VIEW_NAME: &str = "content";

/// Authored news attributes before reference resolution.
///
/// Every `with_*` method assigns a single field and returns the draft, so a
/// draft reads like the markup it came from:
///
/// ```
/// use chrono::DateTime;
/// use folio_model::NewsDraft;
///
/// let pub_date = DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z").unwrap();
/// let draft = NewsDraft::new(pub_date)
///     .with_page("/release-notes")
///     .with_element("summary");
///
/// assert_eq!(draft.target_page(), Some("/release-notes"));
/// assert_eq!(draft.view(), "content");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsDraft {
    id: Option<String>,
    domain: Option<String>,
    book: Option<String>,
    target_page: Option<String>,
    element: Option<String>,
    view: String,
    title: Option<String>,
    description: Option<String>,
    pub_date: DateTime<FixedOffset>,
    allow_robots: Option<bool>,
}

impl NewsDraft {
    /// Create a draft published at `pub_date`, exposed under the default view.
    #[must_use]
    pub fn new(pub_date: DateTime<FixedOffset>) -> Self {
        Self {
            id: None,
            domain: None,
            book: None,
            target_page: None,
            element: None,
            view: DEFAULT_VIEW_NAME.to_owned(),
            title: None,
            description: None,
            pub_date,
            allow_robots: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_book(mut self, book: impl Into<String>) -> Self {
        self.book = Some(book.into());
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.target_page = Some(page.into());
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    #[must_use]
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_pub_date(mut self, pub_date: DateTime<FixedOffset>) -> Self {
        self.pub_date = pub_date;
        self
    }

    #[must_use]
    pub fn with_allow_robots(mut self, allow_robots: Option<bool>) -> Self {
        self.allow_robots = allow_robots;
        self
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    #[must_use]
    pub fn book(&self) -> Option<&str> {
        self.book.as_deref()
    }

    #[must_use]
    pub fn target_page(&self) -> Option<&str> {
        self.target_page.as_deref()
    }

    #[must_use]
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    #[must_use]
    pub fn view(&self) -> &str {
        &self.view
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn pub_date(&self) -> DateTime<FixedOffset> {
        self.pub_date
    }

    /// Robots policy; `None` inherits from the page.
    #[must_use]
    pub fn allow_robots(&self) -> Option<bool> {
        self.allow_robots
    }

    /// Whether the draft names a target book or page.
    #[must_use]
    pub fn has_explicit_target(&self) -> bool {
        self.book.is_some() || self.target_page.is_some()
    }
}

/// Outcome of resolving a [`NewsDraft`] against the page graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNews {
    /// Fully-qualified target page.
    pub target: PageRef,
    /// Target element, when the reference is element-level.
    pub element: Option<ElementId>,
    /// Authored title, or the title derived from the target.
    pub title: String,
}

impl ResolvedNews {
    /// Whether the target lies in a missing book.
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.target.is_missing_book()
    }
}

/// News element as stored in a captured page.
///
/// Ordered most recent first; equal timestamps fall back to title, then the
/// declaring page, then the element id, so sorting is deterministic.
#[derive(Clone, Debug)]
pub struct News {
    page: PageRef,
    id: ElementId,
    draft: NewsDraft,
    resolved: ResolvedNews,
}

impl News {
    /// Combine a draft declared on `page` with its resolution.
    #[must_use]
    pub fn new(page: PageRef, id: ElementId, draft: NewsDraft, resolved: ResolvedNews) -> Self {
        Self {
            page,
            id,
            draft,
            resolved,
        }
    }

    /// Page the news item is declared on.
    #[must_use]
    pub fn page(&self) -> &PageRef {
        &self.page
    }

    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    #[must_use]
    pub fn draft(&self) -> &NewsDraft {
        &self.draft
    }

    #[must_use]
    pub fn resolved(&self) -> &ResolvedNews {
        &self.resolved
    }

    /// Fully-qualified target page.
    #[must_use]
    pub fn target(&self) -> &PageRef {
        &self.resolved.target
    }

    /// Book of the target page, even when the draft left it implicit.
    #[must_use]
    pub fn book(&self) -> &BookName {
        self.resolved.target.book_name()
    }

    /// Path of the target page, even when the draft left it implicit.
    #[must_use]
    pub fn target_page(&self) -> &str {
        self.resolved.target.path()
    }

    #[must_use]
    pub fn element(&self) -> Option<&ElementId> {
        self.resolved.element.as_ref()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.resolved.title
    }

    #[must_use]
    pub fn view(&self) -> &str {
        self.draft.view()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.draft.description()
    }

    #[must_use]
    pub fn pub_date(&self) -> DateTime<FixedOffset> {
        self.draft.pub_date()
    }

    #[must_use]
    pub fn allow_robots(&self) -> Option<bool> {
        self.draft.allow_robots()
    }
}

impl Ord for News {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .pub_date()
            .cmp(&self.pub_date())
            .then_with(|| self.title().cmp(other.title()))
            .then_with(|| self.page.cmp(&other.page))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for News {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for News {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for News {}
