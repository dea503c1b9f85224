//! Identified content nodes inside a page.

use std::borrow::Borrow;
use std::fmt;

use crate::news::News;

/// Identifier of an element, unique within its page.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    /// Create an element id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What an element is.
///
/// The set is closed: consumers look for capabilities with accessors like
/// [`Element::as_news`] instead of probing types.
#[derive(Clone, Debug)]
pub enum ElementKind {
    /// Structural container carrying a human-readable label.
    Section,
    /// Resolved news item.
    News(Box<News>),
}

/// Content node registered on a page.
#[derive(Clone, Debug)]
pub struct Element {
    id: ElementId,
    label: String,
    parent: Option<ElementId>,
    kind: ElementKind,
}

impl Element {
    /// Create a section element.
    #[must_use]
    pub fn section(id: ElementId, label: impl Into<String>, parent: Option<ElementId>) -> Self {
        Self {
            id,
            label: label.into(),
            parent,
            kind: ElementKind::Section,
        }
    }

    /// Create a news element. Its label is the resolved news title.
    #[must_use]
    pub fn news(news: News, parent: Option<ElementId>) -> Self {
        Self {
            id: news.id().clone(),
            label: news.title().to_owned(),
            parent,
            kind: ElementKind::News(Box::new(news)),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Human-readable label, used as link text when the element is targeted.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Id of the enclosing element, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&ElementId> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// The news item, when this element has the news capability.
    #[must_use]
    pub fn as_news(&self) -> Option<&News> {
        match &self.kind {
            ElementKind::News(news) => Some(news),
            ElementKind::Section => None,
        }
    }
}
