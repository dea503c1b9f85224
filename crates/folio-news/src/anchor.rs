//! Permalink anchors for news items.

use std::fmt;

/// Class attribute of news anchors.
pub const NEWS_ANCHOR_CLASS: &str = "folio-news-anchor";

/// Write an empty anchor `div` for the news item `id`.
///
/// # Errors
///
/// Propagates errors from `out`.
pub fn write_news_anchor(out: &mut impl fmt::Write, id: &str) -> fmt::Result {
    write!(
        out,
        "<div class=\"{NEWS_ANCHOR_CLASS}\" id=\"{}\"></div>",
        html_escape::encode_double_quoted_attribute(id)
    )
}

/// Anchor markup for the news item `id`.
///
/// ```
/// assert_eq!(
///     folio_news::news_anchor("v2"),
///     r#"<div class="folio-news-anchor" id="v2"></div>"#
/// );
/// ```
#[must_use]
pub fn news_anchor(id: &str) -> String {
    let mut out = String::new();
    // Writing to a String can't fail
    let _ = write_news_anchor(&mut out, id);
    out
}
