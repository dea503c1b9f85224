//! `folio links` command implementation.

use clap::Args;

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the links command.
#[derive(Args)]
pub(crate) struct LinksArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Page whose news are collected to discover links (default: book root).
    #[arg(long, default_value = "/")]
    from: String,
}

impl LinksArgs {
    /// Execute the links command.
    ///
    /// Collects news from `--from` so that every reachable reference is
    /// resolved, then prints the pages linking to the requested page.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a reachable page can't be
    /// captured.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let (config, site) = self.common.load_site(version)?;
        let target = self.common.page_ref(&config, &site)?;
        let root = site.page_ref(&config.site.default_book, &self.from)?;

        let session = site.session();
        session.news(&root)?;

        let pages = session.linking_pages(&target);
        if pages.is_empty() {
            output.info(&format!("No pages reachable from {root} link to {target}"));
        }
        for page in pages {
            output.data(&page.to_string());
        }
        Ok(())
    }
}
