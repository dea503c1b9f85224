//! `folio news` command implementation.

use clap::Args;
use folio_model::News;
use folio_news::feed::rss_path;
use serde::Serialize;

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the news command.
#[derive(Args)]
pub(crate) struct NewsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print news as JSON.
    #[arg(long)]
    json: bool,

    /// Print at most this many items.
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

/// News item as printed by `--json`.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct NewsItem {
    title: String,
    pub_date: String,
    page: String,
    id: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    element: Option<String>,
    view: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allow_robots: Option<bool>,
    broken: bool,
}

impl From<&News> for NewsItem {
    fn from(news: &News) -> Self {
        Self {
            title: news.title().to_owned(),
            pub_date: news.pub_date().to_rfc3339(),
            page: news.page().to_string(),
            id: news.id().to_string(),
            target: news.target().to_string(),
            element: news.element().map(ToString::to_string),
            view: news.view().to_owned(),
            description: news.description().map(str::to_owned),
            allow_robots: news.allow_robots(),
            broken: news.resolved().is_broken(),
        }
    }
}

/// Format `news` as one text line: date, title and link target.
fn format_line(news: &News) -> String {
    let target = match news.element() {
        Some(element) => format!("{}#{element}", news.target()),
        None => news.target().to_string(),
    };
    format!(
        "{}  {}  -> {target}",
        news.pub_date().format("%Y-%m-%d"),
        news.title()
    )
}

impl NewsArgs {
    /// Execute the news command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a reachable page can't be
    /// captured.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let (config, site) = self.common.load_site(version)?;
        let page_ref = self.common.page_ref(&config, &site)?;

        let session = site.session();
        let mut news = session.news(&page_ref)?;
        tracing::info!(page = %page_ref, count = news.len(), captures = session.capture_count(), "Collected news");
        if let Some(limit) = self.limit {
            news.truncate(limit);
        }

        if self.json {
            let items: Vec<NewsItem> = news.iter().map(NewsItem::from).collect();
            output.data(&serde_json::to_string_pretty(&items)?);
            return Ok(());
        }

        output.highlight(&format!("News for {page_ref} (feed: {})", rss_path(&page_ref)));
        if news.is_empty() {
            output.info("No news found");
        }
        for item in &news {
            if item.resolved().is_broken() {
                output.warning(&format!("Broken reference on {}#{}", item.page(), item.id()));
            }
            output.data(&format_line(item));
            if let Some(description) = item.description() {
                output.detail(&format!("    {description}"));
            }
        }
        Ok(())
    }
}
