//! News reference resolution and page-graph news collection for Folio.
//!
//! This crate provides:
//! - [`NewsResolver`]: Resolves a news draft's target page, element and title
//! - [`collect_news`]: Gathers every news item reachable from a root page
//! - [`write_news_anchor`]: Emits the permalink anchor for a news item
//! - [`feed`]: RSS path conventions for pages
//!
//! Page capture, path resolution and link formatting are provided by the host
//! through the traits in [`host`]. `folio-site` implements them over books
//! stored on disk; [`MockHost`] (behind the `mock` feature) implements them
//! in memory for tests.

mod anchor;
mod collector;
mod error;
pub mod feed;
pub mod host;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod resolver;

pub use anchor::{NEWS_ANCHOR_CLASS, news_anchor, write_news_anchor};
pub use collector::collect_news;
pub use error::{CaptureError, NewsError};
pub use host::{
    DefaultLinkFormatter, LinkFormatter, NodeRef, NoopLinkRecorder, PageCapture, PageLinkRecorder,
    PageRefResolver, TargetRef, broken_reference, join_path,
};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockHost;
pub use resolver::{NewsResolver, Resolution, ResolveContext};
