//! Captured page snapshots.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::element::{Element, ElementId};
use crate::news::News;
use crate::page_ref::PageRef;

/// Depth of content materialization for a captured page.
///
/// Levels are ordered: a page captured at a deeper level satisfies any
/// request for a shallower one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CaptureLevel {
    /// Title and child references only.
    Page,
    /// Title, child references and all elements with news resolved.
    Meta,
    /// Everything in `Meta` plus body markup.
    Body,
}

/// Error returned when two elements of a page share an id.
#[derive(Debug, thiserror::Error)]
#[error("Duplicate element id: {0}")]
pub struct DuplicateElementId(pub ElementId);

/// Immutable snapshot of a captured page.
#[derive(Clone, Debug)]
pub struct Page {
    page_ref: PageRef,
    title: String,
    level: CaptureLevel,
    elements: Vec<Element>,
    elements_by_id: HashMap<ElementId, usize>,
    generated_ids: HashSet<ElementId>,
    child_pages: Vec<PageRef>,
    page_links: BTreeSet<PageRef>,
    body: Option<String>,
}

impl Page {
    #[must_use]
    pub fn page_ref(&self) -> &PageRef {
        &self.page_ref
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Level this snapshot was captured at.
    #[must_use]
    pub fn level(&self) -> CaptureLevel {
        self.level
    }

    /// All elements registered on the page, parents before their children.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements_by_id.get(id).map(|&idx| &self.elements[idx])
    }

    #[must_use]
    pub fn contains_element(&self, id: &str) -> bool {
        self.elements_by_id.contains_key(id)
    }

    /// Whether `id` was assigned by the capture layer rather than authored.
    #[must_use]
    pub fn is_generated_id(&self, id: &str) -> bool {
        self.generated_ids.contains(id)
    }

    #[must_use]
    pub fn generated_ids(&self) -> &HashSet<ElementId> {
        &self.generated_ids
    }

    /// Child page references in declaration order, without duplicates.
    #[must_use]
    pub fn child_pages(&self) -> &[PageRef] {
        &self.child_pages
    }

    /// Other pages this page links to.
    #[must_use]
    pub fn page_links(&self) -> &BTreeSet<PageRef> {
        &self.page_links
    }

    /// Body markup, present only for `Body` captures.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// News items registered directly on this page.
    pub fn news(&self) -> impl Iterator<Item = &News> {
        self.elements.iter().filter_map(Element::as_news)
    }
}

/// Incremental construction of a [`Page`].
///
/// The capture layer registers elements in document order; the page under
/// construction stays readable through [`PageBuilder::page`] so that news
/// items can be resolved against what has been captured so far.
#[derive(Debug)]
pub struct PageBuilder {
    page: Page,
    children_seen: HashSet<PageRef>,
}

impl PageBuilder {
    /// Start a page with its identity, title and capture level.
    #[must_use]
    pub fn new(page_ref: PageRef, title: impl Into<String>, level: CaptureLevel) -> Self {
        Self {
            page: Page {
                page_ref,
                title: title.into(),
                level,
                elements: Vec::new(),
                elements_by_id: HashMap::new(),
                generated_ids: HashSet::new(),
                child_pages: Vec::new(),
                page_links: BTreeSet::new(),
                body: None,
            },
            children_seen: HashSet::new(),
        }
    }

    /// The page as captured so far.
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Add a child page reference. Repeated references are ignored.
    pub fn add_child(&mut self, child: PageRef) {
        if self.children_seen.insert(child.clone()) {
            self.page.child_pages.push(child);
        }
    }

    /// Register an element.
    ///
    /// `generated` marks ids assigned by the capture layer; those may not be
    /// targeted by references.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateElementId`] if the page already has an element with
    /// the same id.
    pub fn add_element(
        &mut self,
        element: Element,
        generated: bool,
    ) -> Result<(), DuplicateElementId> {
        let id = element.id().clone();
        if self.page.elements_by_id.contains_key(&id) {
            return Err(DuplicateElementId(id));
        }
        if generated {
            self.page.generated_ids.insert(id.clone());
        }
        self.page.elements_by_id.insert(id, self.page.elements.len());
        self.page.elements.push(element);
        Ok(())
    }

    /// Record a link to another page.
    pub fn add_page_link(&mut self, target: PageRef) {
        self.page.page_links.insert(target);
    }

    /// Give the page a body, empty until markup is pushed.
    pub fn start_body(&mut self) {
        self.page.body.get_or_insert_with(String::new);
    }

    /// Append markup to the page body.
    pub fn push_body(&mut self, markup: &str) {
        self.page.body.get_or_insert_with(String::new).push_str(markup);
    }

    #[must_use]
    pub fn build(self) -> Page {
        self.page
    }
}
