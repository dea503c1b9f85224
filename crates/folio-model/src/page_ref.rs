//! Page references.
//!
//! A [`PageRef`] identifies a page by book and book-absolute path. The book
//! side carries whether the book is registered in the current deployment: a
//! reference into an unregistered book is still a valid value, it just can't
//! be captured.

use std::cmp::Ordering;
use std::fmt;

/// Name of a book (a content root grouping a tree of pages).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookName(String);

impl BookName {
    /// Create a book name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The literal book name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Book side of a [`PageRef`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BookRef {
    /// Book is registered and may be captured.
    Registered(BookName),
    /// Book is not registered in this deployment.
    Missing(BookName),
}

impl BookRef {
    /// The literal book name, registered or not.
    #[must_use]
    pub fn name(&self) -> &BookName {
        match self {
            Self::Registered(name) | Self::Missing(name) => name,
        }
    }
}

/// Globally unique page identifier: `(book, path)`.
///
/// Paths are book-absolute and start with `/` (e.g. `"/"`, `"/guide/setup"`).
/// Two references are equal when both the literal book name and the path
/// match, so references into two different missing books never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageRef {
    book: BookRef,
    path: String,
}

impl PageRef {
    /// Reference a page in a registered book.
    #[must_use]
    pub fn new(book: BookName, path: impl Into<String>) -> Self {
        Self {
            book: BookRef::Registered(book),
            path: path.into(),
        }
    }

    /// Reference a page in a book that is not registered.
    #[must_use]
    pub fn missing(book: BookName, path: impl Into<String>) -> Self {
        Self {
            book: BookRef::Missing(book),
            path: path.into(),
        }
    }

    /// The registered book, or `None` when the book is missing.
    #[must_use]
    pub fn book(&self) -> Option<&BookName> {
        match &self.book {
            BookRef::Registered(name) => Some(name),
            BookRef::Missing(_) => None,
        }
    }

    /// The literal book name, available even for missing books.
    #[must_use]
    pub fn book_name(&self) -> &BookName {
        self.book.name()
    }

    /// The book side of this reference.
    #[must_use]
    pub fn book_ref(&self) -> &BookRef {
        &self.book
    }

    /// Whether the book is unregistered.
    #[must_use]
    pub fn is_missing_book(&self) -> bool {
        matches!(self.book, BookRef::Missing(_))
    }

    /// Book-absolute path (e.g. `"/guide/setup"`).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory part of the path, always ending in `/`.
    ///
    /// - `"/guide/setup"` -> `"/guide/"`
    /// - `"/guide/"` -> `"/guide/"`
    /// - `"/"` -> `"/"`
    #[must_use]
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..=idx],
            None => "/",
        }
    }
}

impl Ord for PageRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.book_name()
            .cmp(other.book_name())
            .then_with(|| self.path.cmp(&other.path))
            .then_with(|| self.is_missing_book().cmp(&other.is_missing_book()))
    }
}

impl PartialOrd for PageRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.book_name(), self.path)
    }
}
