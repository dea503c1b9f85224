//! RSS feed path conventions.
//!
//! Every page with news has a feed next to it: `/guide/setup` publishes its
//! feed at `/guide/setup.rss`, a directory page `/guide/` at
//! `/guide/index.rss`. Only paths are derived here; feeds are written
//! elsewhere.

use folio_model::PageRef;

/// Extension of feed paths.
pub const RSS_EXTENSION: &str = ".rss";

/// Page source extensions, in the order they are stripped. The empty
/// extension matches any remaining path.
pub const RESOURCE_EXTENSIONS: &[&str] = &[".yaml", ".yml", ""];

/// Source extensions never published as pages, and so never given a feed.
pub const PROTECTED_EXTENSIONS: &[&str] = &[".inc.yaml", ".inc.yml", ".part.yaml"];

/// Whether `path` names a fragment that must never be published.
///
/// ```
/// use folio_news::feed::is_protected_extension;
///
/// assert!(is_protected_extension("/guide/header.inc.yaml"));
/// assert!(!is_protected_extension("/guide/setup.yaml"));
/// ```
#[must_use]
pub fn is_protected_extension(path: &str) -> bool {
    PROTECTED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Path of the feed for `page_ref`, within the page's book.
#[must_use]
pub fn rss_path(page_ref: &PageRef) -> String {
    let path = page_ref.path();
    if path.ends_with('/') {
        return format!("{path}index{RSS_EXTENSION}");
    }
    let stem = RESOURCE_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path);
    format!("{stem}{RSS_EXTENSION}")
}
