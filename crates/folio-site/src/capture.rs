//! Page construction from source documents.

use std::collections::HashSet;

use folio_model::{CaptureLevel, Element, ElementId, News, NewsDraft, Page, PageBuilder, PageRef};
use folio_news::{NewsResolver, PageRefResolver, ResolveContext, TargetRef};

use crate::document::{ChildDoc, ElementDoc, NewsDoc, PageDocument};
use crate::error::SiteError;
use crate::session::CaptureSession;

/// Builds one page for a [`CaptureSession`].
pub(crate) struct PageCapturer<'s, 'a> {
    session: &'s CaptureSession<'a>,
}

impl<'s, 'a> PageCapturer<'s, 'a> {
    pub(crate) fn new(session: &'s CaptureSession<'a>) -> Self {
        Self { session }
    }

    pub(crate) fn capture(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Page, SiteError> {
        let doc = self.session.site().load_document(page_ref)?;
        let mut builder = PageBuilder::new(page_ref.clone(), doc.title.clone(), level);

        for child in &doc.children {
            let target = match child {
                ChildDoc::Path(path) => TargetRef {
                    domain: None,
                    book: None,
                    path: path.as_str(),
                },
                ChildDoc::Book { book, page } => TargetRef {
                    domain: None,
                    book: Some(book.as_str()),
                    path: page.as_str(),
                },
            };
            builder.add_child(self.session.resolve_page_ref(page_ref, &target)?);
        }

        if level == CaptureLevel::Body {
            builder.start_body();
        }
        if level >= CaptureLevel::Meta {
            let mut ids = IdGenerator::new(&doc);
            let mut state = ElementState {
                builder: &mut builder,
                ids: &mut ids,
                level,
            };
            self.add_elements(&mut state, &doc.elements, None)?;
        }

        Ok(builder.build())
    }

    fn add_elements(
        &self,
        state: &mut ElementState<'_>,
        elements: &[ElementDoc],
        parent: Option<&ElementId>,
    ) -> Result<(), SiteError> {
        for element in elements {
            match element {
                ElementDoc::Section {
                    id,
                    label,
                    elements,
                } => {
                    let (id, generated) = state.ids.assign(id.as_deref(), label);
                    let section = Element::section(id.clone(), label.clone(), parent.cloned());
                    let page_ref = state.builder.page().page_ref().clone();
                    state
                        .builder
                        .add_element(section, generated)
                        .map_err(|e| SiteError::duplicate_id(&page_ref, &e))?;
                    self.add_elements(state, elements, Some(&id))?;
                }
                ElementDoc::News(news) => self.add_news(state, news, parent)?,
            }
        }
        Ok(())
    }

    fn add_news(
        &self,
        state: &mut ElementState<'_>,
        doc: &NewsDoc,
        parent: Option<&ElementId>,
    ) -> Result<(), SiteError> {
        let draft = draft_from(doc, self.session.site().default_view());
        let (id, generated) = state
            .ids
            .assign(doc.id.as_deref(), doc.title.as_deref().unwrap_or("news"));

        let page = state.builder.page();
        let ctx = ResolveContext {
            page,
            element: parent.and_then(|p| page.element(p.as_str())),
            news_id: Some(&id),
            level: state.level,
        };
        let resolution = NewsResolver::new(self.session, self.session)
            .with_formatter(self.session)
            .with_link_recorder(self.session)
            .resolve(&ctx, &draft)?;

        let page_ref = page.page_ref().clone();
        if resolution.news.target != page_ref {
            state.builder.add_page_link(resolution.news.target.clone());
        }
        if let Some(anchor) = &resolution.anchor {
            state.builder.push_body(anchor);
        }

        let news = News::new(page_ref.clone(), id, draft, resolution.news);
        state
            .builder
            .add_element(Element::news(news, parent.cloned()), generated)
            .map_err(|e| SiteError::duplicate_id(&page_ref, &e))
    }
}

struct ElementState<'b> {
    builder: &'b mut PageBuilder,
    ids: &'b mut IdGenerator,
    level: CaptureLevel,
}

fn draft_from(doc: &NewsDoc, default_view: &str) -> NewsDraft {
    let mut draft = NewsDraft::new(doc.pub_date)
        .with_view(doc.view.as_deref().unwrap_or(default_view))
        .with_allow_robots(doc.allow_robots);
    if let Some(id) = &doc.id {
        draft = draft.with_id(id.as_str());
    }
    if let Some(domain) = &doc.domain {
        draft = draft.with_domain(domain.as_str());
    }
    if let Some(book) = &doc.book {
        draft = draft.with_book(book.as_str());
    }
    if let Some(page) = &doc.page {
        draft = draft.with_page(page.as_str());
    }
    if let Some(element) = &doc.element {
        draft = draft.with_element(element.as_str());
    }
    if let Some(title) = &doc.title {
        draft = draft.with_title(title.as_str());
    }
    if let Some(description) = &doc.description {
        draft = draft.with_description(description.as_str());
    }
    draft
}

/// Assigns element ids, generating unique slugs for elements without one.
struct IdGenerator {
    taken: HashSet<String>,
}

impl IdGenerator {
    /// Reserve every authored id in `doc` up front, so a generated id never
    /// takes an id authored further down the page.
    fn new(doc: &PageDocument) -> Self {
        Self {
            taken: doc.authored_ids().into_iter().map(str::to_owned).collect(),
        }
    }

    /// Id for an element; the flag is set when the id was generated.
    fn assign(&mut self, authored: Option<&str>, label: &str) -> (ElementId, bool) {
        if let Some(id) = authored {
            return (ElementId::new(id), false);
        }

        let base = slugify(label);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.taken.insert(candidate.clone());
        (ElementId::new(candidate), true)
    }
}

/// Lowercase slug of `label`, keeping Unicode letters and digits;
/// `element` when nothing is left.
fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "element".to_owned()
    } else {
        slug.to_owned()
    }
}
