//! CLI command implementations.

pub(crate) mod links;
pub(crate) mod news;

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_model::PageRef;
use folio_site::Site;

use crate::error::CliError;

pub(crate) use links::LinksArgs;
pub(crate) use news::NewsArgs;

/// Arguments shared by every page command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Book holding the page (default: site.default_book).
    #[arg(short, long, env = "FOLIO_BOOK")]
    book: Option<String>,

    /// Page path within the book.
    #[arg(default_value = "/")]
    page: String,

    /// Disable the page cache.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load configuration and build the site it describes.
    fn load_site(&self, version: &str) -> Result<(Config, Site), CliError> {
        let cli_settings = CliSettings {
            default_book: self.book.clone(),
            cache_enabled: self.no_cache.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = Site::from_config(&config, version);
        Ok((config, site))
    }

    /// Resolve the page argument against the configured default book.
    fn page_ref(&self, config: &Config, site: &Site) -> Result<PageRef, CliError> {
        Ok(site.page_ref(&config.site.default_book, &self.page)?)
    }
}
