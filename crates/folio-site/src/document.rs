//! Page source documents.
//!
//! A page is authored as a YAML document stored in its book:
//!
//! ```yaml
//! title: Release notes
//! children:
//!   - guide/setup
//!   - { book: archive, page: /2019 }
//! elements:
//!   - kind: section
//!     id: summary
//!     label: Summary
//!   - kind: news
//!     pub_date: 2024-01-10T00:00:00Z
//!     element: summary
//! ```
//!
//! Page `/a/b` is stored at `a/b.yaml`; `/` and paths ending in `/` map to
//! the directory's `index.yaml`.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Source file name of directory pages.
const INDEX_FILE: &str = "index.yaml";

/// Parsed page source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageDocument {
    pub title: String,
    #[serde(default)]
    pub children: Vec<ChildDoc>,
    #[serde(default)]
    pub elements: Vec<ElementDoc>,
}

/// Reference to a child page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildDoc {
    /// Path in the same book, absolute or relative to the page's directory.
    Path(String),
    /// Page in another book.
    Book { book: String, page: String },
}

/// Element declared on a page, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ElementDoc {
    Section {
        #[serde(default)]
        id: Option<String>,
        label: String,
        #[serde(default)]
        elements: Vec<ElementDoc>,
    },
    News(Box<NewsDoc>),
}

/// News item as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewsDoc {
    #[serde(default)]
    pub id: Option<String>,
    pub pub_date: DateTime<FixedOffset>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub book: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub allow_robots: Option<bool>,
}

impl PageDocument {
    /// Parse a YAML page source.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed documents.
    pub fn parse(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Authored element ids, depth first.
    #[must_use]
    pub fn authored_ids(&self) -> Vec<&str> {
        fn walk<'a>(elements: &'a [ElementDoc], out: &mut Vec<&'a str>) {
            for element in elements {
                match element {
                    ElementDoc::Section { id, elements, .. } => {
                        out.extend(id.as_deref());
                        walk(elements, out);
                    }
                    ElementDoc::News(news) => out.extend(news.id.as_deref()),
                }
            }
        }

        let mut ids = Vec::new();
        walk(&self.elements, &mut ids);
        ids
    }
}

/// Storage path of the source for page `path`.
///
/// ```
/// use std::path::PathBuf;
/// use folio_site::source_path;
///
/// assert_eq!(source_path("/"), PathBuf::from("index.yaml"));
/// assert_eq!(source_path("/guide/"), PathBuf::from("guide/index.yaml"));
/// assert_eq!(source_path("/guide/setup"), PathBuf::from("guide/setup.yaml"));
/// ```
#[must_use]
pub fn source_path(path: &str) -> PathBuf {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') {
        PathBuf::from(format!("{relative}{INDEX_FILE}"))
    } else {
        PathBuf::from(format!("{relative}.yaml"))
    }
}
