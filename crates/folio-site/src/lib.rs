//! Book registry and page capture for Folio.
//!
//! This crate provides:
//! - [`Site`]: Registered books, their page sources and the document cache
//! - [`CaptureSession`]: Memoizing page capture, host for news resolution
//! - [`PageDocument`]: The YAML page source format
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use folio_cache::NullCache;
//! use folio_site::Site;
//! use folio_storage::FsStorage;
//!
//! let site = Site::new(&NullCache).with_book("docs", Arc::new(FsStorage::new("docs".into())));
//! let session = site.session();
//! for news in session.news(&site.page_ref("docs", "/")?)? {
//!     println!("{} {}", news.pub_date(), news.title());
//! }
//! # Ok(())
//! # }
//! ```

mod capture;
mod document;
mod error;
mod session;
mod site;

pub use document::{ChildDoc, ElementDoc, NewsDoc, PageDocument, source_path};
pub use error::SiteError;
pub use session::CaptureSession;
pub use site::Site;
