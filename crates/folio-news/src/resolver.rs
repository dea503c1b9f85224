//! News reference resolution.
//!
//! [`NewsResolver`] determines which page and element a news item refers to
//! and what it should be titled. Resolution is a pure function of the draft,
//! the page being captured and the host: the draft is never modified, the
//! outcome is returned as a [`Resolution`].
//!
//! # Target page
//!
//! | `book` | `page` | Target |
//! |---|---|---|
//! | - | - | Current page |
//! | - | set | `page` resolved in the current book |
//! | set | set | `page` resolved in `book` |
//! | set | - | Error: page required |
//!
//! A target in the current page is served from the page under construction
//! when possible. Capturing the current page again would recurse, so an element
//! reference to a not-yet-captured element of the current page is rejected.

use std::ops::Deref;
use std::sync::Arc;

use folio_model::{CaptureLevel, Element, ElementId, NewsDraft, Page, PageRef, ResolvedNews};

use crate::anchor::news_anchor;
use crate::error::NewsError;
use crate::host::{
    DefaultLinkFormatter, LinkFormatter, NodeRef, NoopLinkRecorder, PageCapture,
    PageLinkRecorder, PageRefResolver, TargetRef,
};

/// Where a news item is being resolved.
#[derive(Clone, Copy, Debug)]
pub struct ResolveContext<'a> {
    /// Page being captured, holding the elements captured so far.
    pub page: &'a Page,
    /// Nearest element enclosing the news item.
    pub element: Option<&'a Element>,
    /// Id the news item is registered under, authored or generated.
    /// Falls back to the draft's authored id.
    pub news_id: Option<&'a ElementId>,
    /// Level the page is being captured at.
    pub level: CaptureLevel,
}

/// Result of resolving one news draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved target and title.
    pub news: ResolvedNews,
    /// Anchor markup, emitted only for body captures of news with an id.
    pub anchor: Option<String>,
}

/// Target page, either the page under construction or a captured snapshot.
enum TargetPage<'a> {
    Current(&'a Page),
    Captured(Arc<Page>),
}

impl Deref for TargetPage<'_> {
    type Target = Page;

    fn deref(&self) -> &Page {
        match self {
            Self::Current(page) => page,
            Self::Captured(page) => page,
        }
    }
}

/// Resolves news drafts against the page graph.
///
/// # Example
///
/// ```ignore
/// let resolver = NewsResolver::new(&session, &session).with_link_recorder(&session);
/// let ctx = ResolveContext { page: builder.page(), element: None, news_id: None, level: CaptureLevel::Meta };
/// let resolution = resolver.resolve(&ctx, &draft)?;
/// ```
pub struct NewsResolver<'a> {
    refs: &'a dyn PageRefResolver,
    capture: &'a dyn PageCapture,
    formatter: &'a dyn LinkFormatter,
    links: &'a dyn PageLinkRecorder,
}

impl<'a> NewsResolver<'a> {
    /// Create a resolver with default link formatting and no link recording.
    #[must_use]
    pub fn new(refs: &'a dyn PageRefResolver, capture: &'a dyn PageCapture) -> Self {
        Self {
            refs,
            capture,
            formatter: &DefaultLinkFormatter,
            links: &NoopLinkRecorder,
        }
    }

    /// Use a custom link formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: &'a dyn LinkFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Report page links to `links`.
    #[must_use]
    pub fn with_link_recorder(mut self, links: &'a dyn PageLinkRecorder) -> Self {
        self.links = links;
        self
    }

    /// Resolve `draft` as declared in `ctx`.
    ///
    /// # Errors
    ///
    /// - [`NewsError::InvalidReference`] if a book is given without a page
    /// - [`NewsError::UnsupportedForwardReference`] for an element reference
    ///   to an element of the current page that is not captured yet
    /// - [`NewsError::ElementNotFound`] / [`NewsError::GeneratedIdNotAllowed`]
    ///   for a bad explicit element id
    /// - [`NewsError::InvariantViolation`] if the target element has no label
    /// - [`NewsError::Capture`] if capturing the target page fails
    pub fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        draft: &NewsDraft,
    ) -> Result<Resolution, NewsError> {
        let current_ref = ctx.page.page_ref();
        let element_id = draft.element();

        let target_ref = self.target_page_ref(current_ref, draft)?;

        if target_ref != *current_ref {
            let from = match ctx.element {
                Some(element) => NodeRef::Element {
                    page: current_ref,
                    id: element.id(),
                },
                None => NodeRef::Page(current_ref),
            };
            self.links.record_page_link(&from, &target_ref);
        }

        let target_page = self.target_page(ctx.page, &target_ref, element_id)?;

        let target_element = match (element_id, target_page.as_deref()) {
            (Some(id), Some(page)) => Some(Self::explicit_element(page, id)?),
            (None, Some(_)) if !draft.has_explicit_target() => ctx.element,
            _ => None,
        };

        let title = match draft.title() {
            Some(title) => title.to_owned(),
            None => match (target_element, target_page.as_deref()) {
                (Some(element), _) => {
                    if element.label().is_empty() {
                        return Err(NewsError::InvariantViolation {
                            page: target_ref,
                            element: element.id().to_string(),
                        });
                    }
                    element.label().to_owned()
                }
                (None, Some(page)) => page.title().to_owned(),
                (None, None) => self
                    .formatter
                    .format_broken_reference(&target_ref, element_id),
            },
        };

        let element = match element_id {
            Some(id) => Some(ElementId::new(id)),
            None => target_element.map(|element| element.id().clone()),
        };

        let anchor = if ctx.level == CaptureLevel::Body {
            ctx.news_id
                .map(ElementId::as_str)
                .or(draft.id())
                .map(|id| news_anchor(&self.formatter.scoped_anchor_id(ctx.page, id)))
        } else {
            None
        };

        Ok(Resolution {
            news: ResolvedNews {
                target: target_ref,
                element,
                title,
            },
            anchor,
        })
    }

    fn target_page_ref(
        &self,
        current: &PageRef,
        draft: &NewsDraft,
    ) -> Result<PageRef, NewsError> {
        match (draft.book(), draft.target_page()) {
            (None, _) if draft.domain().is_some() => Err(NewsError::invalid_reference(
                current,
                "book required when domain provided",
            )),
            (None, None) => Ok(current.clone()),
            (Some(_), None) => Err(NewsError::invalid_reference(
                current,
                "page required when book provided",
            )),
            (book, Some(path)) => self.refs.resolve_page_ref(
                current,
                &TargetRef {
                    domain: draft.domain(),
                    book,
                    path,
                },
            ),
        }
    }

    fn target_page<'p>(
        &self,
        current: &'p Page,
        target_ref: &PageRef,
        element_id: Option<&str>,
    ) -> Result<Option<TargetPage<'p>>, NewsError> {
        if target_ref.is_missing_book() {
            return Ok(None);
        }

        let is_current = target_ref == current.page_ref();
        if is_current && element_id.is_none_or(|id| current.contains_element(id)) {
            return Ok(Some(TargetPage::Current(current)));
        }

        if is_current {
            return Err(NewsError::UnsupportedForwardReference {
                page: target_ref.clone(),
                element: element_id.unwrap_or_default().to_owned(),
            });
        }

        let level = if element_id.is_some() {
            CaptureLevel::Meta
        } else {
            CaptureLevel::Page
        };
        tracing::trace!(target = %target_ref, ?level, "Capturing news target");
        let captured = self.capture.capture_page(target_ref, level)?;
        Ok(captured.map(TargetPage::Captured))
    }

    fn explicit_element<'p>(page: &'p Page, id: &str) -> Result<&'p Element, NewsError> {
        let element = page.element(id).ok_or_else(|| NewsError::ElementNotFound {
            page: page.page_ref().clone(),
            element: id.to_owned(),
        })?;
        if page.is_generated_id(id) {
            return Err(NewsError::GeneratedIdNotAllowed {
                page: page.page_ref().clone(),
                element: id.to_owned(),
            });
        }
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset};
    use folio_model::{BookName, PageBuilder};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::broken_reference;
    use crate::mock::MockHost;

    fn date(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn docs(path: &str) -> PageRef {
        PageRef::new(BookName::new("docs"), path)
    }

    fn draft() -> NewsDraft {
        NewsDraft::new(date("2024-01-10T00:00:00Z"))
    }

    /// Page `/release` in `docs` with an authored `summary` and a generated `section-1`.
    fn release_page() -> Page {
        let mut builder = PageBuilder::new(docs("/release"), "Release Notes", CaptureLevel::Meta);
        builder
            .add_element(Element::section(ElementId::new("summary"), "Summary", None), false)
            .unwrap();
        builder
            .add_element(Element::section(ElementId::new("section-1"), "Other", None), true)
            .unwrap();
        builder
            .add_element(Element::section(ElementId::new("blank"), "", None), false)
            .unwrap();
        builder.build()
    }

    fn host() -> MockHost {
        MockHost::new().with_book("docs").with_page(release_page())
    }

    fn current(path: &str) -> PageBuilder {
        PageBuilder::new(docs(path), "Current", CaptureLevel::Meta)
    }

    fn resolve(host: &MockHost, page: &Page, draft: &NewsDraft) -> Result<Resolution, NewsError> {
        let ctx = ResolveContext {
            page,
            element: None,
            news_id: None,
            level: CaptureLevel::Meta,
        };
        NewsResolver::new(host, host)
            .with_link_recorder(host)
            .resolve(&ctx, draft)
    }

    #[test]
    fn test_no_book_no_page_targets_current_page() {
        let host = host();
        let page = current("/news").build();

        let resolution = resolve(&host, &page, &draft()).unwrap();

        assert_eq!(resolution.news.target, docs("/news"));
        assert_eq!(resolution.news.title, "Current");
        assert!(resolution.news.element.is_none());
        assert_eq!(host.capture_count(), 0);
        assert!(host.recorded_links().is_empty());
    }

    #[test]
    fn test_book_without_page_is_invalid() {
        let host = host();
        let page = current("/news").build();

        let err = resolve(&host, &page, &draft().with_book("docs")).unwrap_err();

        assert!(matches!(err, NewsError::InvalidReference { .. }));
        assert!(err.to_string().contains("page required when book provided"));
    }

    #[test]
    fn test_domain_without_book_is_invalid() {
        let host = host();
        let page = current("/news").build();

        let err = resolve(
            &host,
            &page,
            &draft().with_domain("example.com").with_page("/release"),
        )
        .unwrap_err();

        assert!(matches!(err, NewsError::InvalidReference { .. }));
    }

    #[test]
    fn test_relative_page_resolved_in_current_book() {
        let host = host();
        let page = current("/news").build();

        let resolution = resolve(&host, &page, &draft().with_page("release")).unwrap();

        assert_eq!(resolution.news.target, docs("/release"));
        assert_eq!(resolution.news.title, "Release Notes");
        assert!(resolution.news.element.is_none());
        assert_eq!(host.captures(), vec![(docs("/release"), CaptureLevel::Page)]);
    }

    #[test]
    fn test_page_link_recorded_for_other_page() {
        let host = host();
        let page = current("/news").build();

        resolve(&host, &page, &draft().with_page("/release")).unwrap();

        assert_eq!(
            host.recorded_links(),
            vec![(docs("/news"), None, docs("/release"))]
        );
    }

    #[test]
    fn test_page_link_from_enclosing_element() {
        let host = host();
        let mut builder = current("/news");
        builder
            .add_element(Element::section(ElementId::new("latest"), "Latest", None), false)
            .unwrap();
        let page = builder.build();
        let ctx = ResolveContext {
            page: &page,
            element: page.element("latest"),
            news_id: None,
            level: CaptureLevel::Meta,
        };

        NewsResolver::new(&host, &host)
            .with_link_recorder(&host)
            .resolve(&ctx, &draft().with_page("/release"))
            .unwrap();

        assert_eq!(
            host.recorded_links(),
            vec![(
                docs("/news"),
                Some(ElementId::new("latest")),
                docs("/release")
            )]
        );
    }

    #[test]
    fn test_explicit_element_titles_with_label() {
        let host = host();
        let page = current("/news").build();

        let resolution = resolve(
            &host,
            &page,
            &draft().with_page("/release").with_element("summary"),
        )
        .unwrap();

        assert_eq!(resolution.news.title, "Summary");
        assert_eq!(resolution.news.element, Some(ElementId::new("summary")));
        assert_eq!(host.captures(), vec![(docs("/release"), CaptureLevel::Meta)]);
    }

    #[test]
    fn test_explicit_element_not_found() {
        let host = host();
        let page = current("/news").build();

        let err = resolve(
            &host,
            &page,
            &draft().with_page("/release").with_element("absent"),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            NewsError::ElementNotFound { ref element, .. } if element == "absent"
        ));
    }

    #[test]
    fn test_generated_id_not_allowed() {
        let host = host();
        let page = current("/news").build();

        let err = resolve(
            &host,
            &page,
            &draft().with_page("/release").with_element("section-1"),
        )
        .unwrap_err();

        assert!(matches!(err, NewsError::GeneratedIdNotAllowed { .. }));
    }

    #[test]
    fn test_empty_label_is_invariant_violation() {
        let host = host();
        let page = current("/news").build();

        let err = resolve(
            &host,
            &page,
            &draft().with_page("/release").with_element("blank"),
        )
        .unwrap_err();

        assert!(matches!(err, NewsError::InvariantViolation { .. }));
    }

    #[test]
    fn test_empty_label_allowed_with_explicit_title() {
        let host = host();
        let page = current("/news").build();

        let resolution = resolve(
            &host,
            &page,
            &draft()
                .with_page("/release")
                .with_element("blank")
                .with_title("Fixes"),
        )
        .unwrap();

        assert_eq!(resolution.news.title, "Fixes");
    }

    #[test]
    fn test_missing_book_degrades_to_broken_title() {
        let host = host();
        let page = current("/news").build();

        let resolution = resolve(
            &host,
            &page,
            &draft().with_book("missing-book").with_page("/x"),
        )
        .unwrap();

        let target = PageRef::missing(BookName::new("missing-book"), "/x");
        assert_eq!(resolution.news.title, broken_reference(&target, None));
        assert_eq!(resolution.news.target, target);
        assert!(resolution.news.is_broken());
        assert_eq!(host.capture_count(), 0);
    }

    #[test]
    fn test_missing_book_with_element_keeps_element_in_title() {
        let host = host();
        let page = current("/news").build();

        let resolution = resolve(
            &host,
            &page,
            &draft()
                .with_book("missing-book")
                .with_page("/x")
                .with_element("intro"),
        )
        .unwrap();

        let target = PageRef::missing(BookName::new("missing-book"), "/x");
        assert_eq!(resolution.news.title, broken_reference(&target, Some("intro")));
        assert_eq!(resolution.news.element, Some(ElementId::new("intro")));
    }

    #[test]
    fn test_self_reference_to_captured_element_reuses_current_page() {
        let host = host();
        let mut builder = current("/news");
        builder
            .add_element(Element::section(ElementId::new("top"), "Top Story", None), false)
            .unwrap();
        let page = builder.build();

        let resolution = resolve(&host, &page, &draft().with_element("top")).unwrap();

        assert_eq!(resolution.news.title, "Top Story");
        assert_eq!(resolution.news.target, docs("/news"));
        assert_eq!(host.capture_count(), 0);
    }

    #[test]
    fn test_forward_self_reference_unsupported() {
        let host = host();
        let page = current("/news").build();

        let err = resolve(&host, &page, &draft().with_element("later")).unwrap_err();

        assert!(matches!(err, NewsError::UnsupportedForwardReference { .. }));
        assert_eq!(host.capture_count(), 0);
    }

    #[test]
    fn test_explicit_self_page_with_forward_element_unsupported() {
        let host = host();
        let page = current("/news").build();

        let err = resolve(
            &host,
            &page,
            &draft().with_page("/news").with_element("later"),
        )
        .unwrap_err();

        assert!(matches!(err, NewsError::UnsupportedForwardReference { .. }));
    }

    #[test]
    fn test_default_element_is_enclosing_element() {
        let host = host();
        let mut builder = current("/news");
        builder
            .add_element(Element::section(ElementId::new("latest"), "Latest", None), false)
            .unwrap();
        let page = builder.build();
        let ctx = ResolveContext {
            page: &page,
            element: page.element("latest"),
            news_id: None,
            level: CaptureLevel::Meta,
        };

        let resolution = NewsResolver::new(&host, &host).resolve(&ctx, &draft()).unwrap();

        assert_eq!(resolution.news.element, Some(ElementId::new("latest")));
        assert_eq!(resolution.news.title, "Latest");
    }

    #[test]
    fn test_explicit_page_ignores_enclosing_element() {
        let host = host();
        let mut builder = current("/news");
        builder
            .add_element(Element::section(ElementId::new("latest"), "Latest", None), false)
            .unwrap();
        let page = builder.build();
        let ctx = ResolveContext {
            page: &page,
            element: page.element("latest"),
            news_id: None,
            level: CaptureLevel::Meta,
        };

        let resolution = NewsResolver::new(&host, &host)
            .resolve(&ctx, &draft().with_page("/release"))
            .unwrap();

        assert!(resolution.news.element.is_none());
        assert_eq!(resolution.news.title, "Release Notes");
    }

    #[test]
    fn test_explicit_title_kept() {
        let host = host();
        let page = current("/news").build();

        let resolution = resolve(
            &host,
            &page,
            &draft().with_page("/release").with_title("Big release"),
        )
        .unwrap();

        assert_eq!(resolution.news.title, "Big release");
        assert_eq!(resolution.news.target, docs("/release"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let host = host();
        let page = current("/news").build();
        let draft = draft().with_page("/release").with_element("summary");

        let first = resolve(&host, &page, &draft).unwrap();
        let second = resolve(&host, &page, &draft).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_capture_failure_propagates() {
        let host = host().with_failing_page(docs("/broken"));
        let page = current("/news").build();

        let err = resolve(&host, &page, &draft().with_page("/broken")).unwrap_err();

        let NewsError::Capture(capture) = err else {
            panic!("expected capture error, got {err:?}");
        };
        assert_eq!(capture.page(), &docs("/broken"));
    }

    #[test]
    fn test_anchor_only_at_body_level() {
        let host = host();
        let page = current("/news").build();
        let draft = draft().with_id("launch\"day");

        let meta = resolve(&host, &page, &draft).unwrap();
        assert!(meta.anchor.is_none());

        let ctx = ResolveContext {
            page: &page,
            element: None,
            news_id: None,
            level: CaptureLevel::Body,
        };
        let body = NewsResolver::new(&host, &host).resolve(&ctx, &draft).unwrap();
        assert_eq!(
            body.anchor.as_deref(),
            Some("<div class=\"folio-news-anchor\" id=\"launch&quot;day\"></div>")
        );
    }

    #[test]
    fn test_anchor_uses_registered_id() {
        let host = host();
        let page = current("/news").build();
        let generated = ElementId::new("news-2");
        let ctx = ResolveContext {
            page: &page,
            element: None,
            news_id: Some(&generated),
            level: CaptureLevel::Body,
        };

        let resolution = NewsResolver::new(&host, &host).resolve(&ctx, &draft()).unwrap();

        assert_eq!(
            resolution.anchor.as_deref(),
            Some("<div class=\"folio-news-anchor\" id=\"news-2\"></div>")
        );
    }

    #[test]
    fn test_custom_formatter_scopes_anchor() {
        struct Prefixed;
        impl LinkFormatter for Prefixed {
            fn scoped_anchor_id(&self, page: &Page, raw_id: &str) -> String {
                format!("{}-{raw_id}", page.page_ref().path().trim_matches('/'))
            }
        }

        let host = host();
        let page = current("/news").build();
        let ctx = ResolveContext {
            page: &page,
            element: None,
            news_id: None,
            level: CaptureLevel::Body,
        };

        let resolution = NewsResolver::new(&host, &host)
            .with_formatter(&Prefixed)
            .resolve(&ctx, &draft().with_id("launch"))
            .unwrap();

        assert_eq!(
            resolution.anchor.as_deref(),
            Some("<div class=\"folio-news-anchor\" id=\"news-launch\"></div>")
        );
    }
}
