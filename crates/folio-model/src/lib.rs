//! Page, element and news data types for Folio.
//!
//! This crate holds the leaf types shared by the capture layer and the news
//! resolver:
//!
//! - [`PageRef`]: Globally unique `(book, path)` page identifier
//! - [`Page`] / [`PageBuilder`]: Captured page snapshots and their construction
//! - [`Element`]: Identified content nodes inside a page
//! - [`NewsDraft`] / [`News`]: News items before and after reference resolution
//!
//! # Example
//!
//! ```
//! use folio_model::{BookName, CaptureLevel, PageBuilder, PageRef};
//!
//! let page_ref = PageRef::new(BookName::new("docs"), "/guide");
//! let page = PageBuilder::new(page_ref.clone(), "Guide", CaptureLevel::Meta).build();
//!
//! assert_eq!(page.page_ref(), &page_ref);
//! assert_eq!(page.title(), "Guide");
//! assert!(page.elements().is_empty());
//! ```

mod element;
mod news;
mod page;
mod page_ref;

pub use element::{Element, ElementId, ElementKind};
pub use news::{DEFAULT_VIEW_NAME, News, NewsDraft, ResolvedNews};
pub use page::{CaptureLevel, DuplicateElementId, Page, PageBuilder};
pub use page_ref::{BookName, BookRef, PageRef};
