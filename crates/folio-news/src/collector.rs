//! News collection over the page graph.

use std::collections::HashSet;
use std::sync::Arc;

use folio_model::{CaptureLevel, News, Page, PageRef};

use crate::error::CaptureError;
use crate::host::PageCapture;

/// Collect every news item declared on `root` and the pages reachable from it
/// through child references.
///
/// Each page is visited once, however many parents reference it. Children in
/// a missing or inaccessible book are skipped. The result is sorted most
/// recent first (see [`News`]'s ordering).
///
/// # Errors
///
/// Returns the first [`CaptureError`] raised while capturing an accessible page.
pub fn collect_news(capture: &dyn PageCapture, root: &Page) -> Result<Vec<News>, CaptureError> {
    tracing::debug!(root = %root.page_ref(), "Collecting news");

    let root = if root.level() < CaptureLevel::Meta {
        match capture.capture_page(root.page_ref(), CaptureLevel::Meta)? {
            Some(page) => page,
            None => return Ok(Vec::new()),
        }
    } else {
        Arc::new(root.clone())
    };

    let mut visited: HashSet<PageRef> = HashSet::new();
    visited.insert(root.page_ref().clone());
    let mut stack: Vec<Arc<Page>> = vec![root];
    let mut news: Vec<News> = Vec::new();
    let mut pages = 0usize;

    while let Some(page) = stack.pop() {
        pages += 1;
        news.extend(page.news().cloned());

        // Reverse so children are visited in declaration order
        for child in page.child_pages().iter().rev() {
            if visited.contains(child) {
                continue;
            }
            let accessible = child
                .book()
                .is_some_and(|book| capture.is_book_accessible(book));
            if !accessible {
                tracing::trace!(child = %child, "Skipping child in unavailable book");
                continue;
            }
            visited.insert(child.clone());
            match capture.capture_page(child, CaptureLevel::Meta)? {
                Some(captured) => stack.push(captured),
                None => tracing::trace!(child = %child, "Skipping child with missing book"),
            }
        }
    }

    news.sort();
    tracing::debug!(pages, news = news.len(), "Collected news");
    Ok(news)
}
