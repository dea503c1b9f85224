//! Configuration management for Folio.
//!
//! Parses `folio.toml` with serde and discovers it in the working directory
//! or its parents. CLI settings are applied during load via [`CliSettings`].
//!
//! ```toml
//! [site]
//! default_book = "docs"
//! default_view = "content"
//!
//! [[books]]
//! name = "docs"
//! source_dir = "docs"
//! domain = "example.com"
//!
//! [cache]
//! enabled = true
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `books[].source_dir` and `books[].domain` support `${VAR}` and
//! `${VAR:-default}`. An unset variable without a default is an error.

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the default book.
    pub default_book: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// View rendered when a news item names none.
const DEFAULT_VIEW: &str = "content";

/// Configuration as written in `folio.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigRaw {
    site: SiteConfigRaw,
    books: Vec<BookConfigRaw>,
    cache: CacheConfigRaw,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SiteConfigRaw {
    default_book: Option<String>,
    default_view: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BookConfigRaw {
    name: String,
    source_dir: String,
    domain: Option<String>,
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CacheConfigRaw {
    enabled: Option<bool>,
}

/// Resolved application configuration.
#[derive(Debug)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,
    /// Registered books, in declaration order.
    pub books: Vec<BookConfig>,
    /// Cache settings.
    pub cache: CacheConfig,
    /// Path to the config file, when one was loaded.
    pub config_path: Option<PathBuf>,
}

/// Site-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Book used when a command names none.
    pub default_book: String,
    /// View used by news items that name none.
    pub default_view: String,
}

/// A registered book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookConfig {
    /// Book name, unique within the site.
    pub name: String,
    /// Absolute directory holding the book's page sources.
    pub source_dir: PathBuf,
    /// Domain the book is published under.
    pub domain: Option<String>,
    /// Disabled books are known by name but treated as missing.
    pub enabled: bool,
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache directory (`.folio/cache` next to the config file).
    pub dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`books.source_dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_ROOT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `folio.toml` in the current directory and its parents, falling
    /// back to a single `docs` book in the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
            Self::default_with_base(&std::env::current_dir()?)
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from TOML text, resolving paths against `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or expansion fails, or the result is invalid.
    pub fn from_toml(content: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let mut raw: ConfigRaw = toml::from_str(content)?;
        raw.expand_env_vars()?;
        let config = Self::resolve(raw, config_dir);
        config.validate()?;
        Ok(config)
    }

    /// Look up a book by name.
    #[must_use]
    pub fn book(&self, name: &str) -> Option<&BookConfig> {
        self.books.iter().find(|book| book.name == name)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if there are no books, a book name is
    /// empty or repeated, or the default book is not configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.books.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[books]] entry is required".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for book in &self.books {
            if book.name.is_empty() {
                return Err(ConfigError::Validation(
                    "books.name cannot be empty".to_owned(),
                ));
            }
            if !seen.insert(book.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate book name: {}",
                    book.name
                )));
            }
        }

        if self.book(&self.site.default_book).is_none() {
            return Err(ConfigError::Validation(format!(
                "site.default_book names unknown book: {}",
                self.site.default_book
            )));
        }
        if self.site.default_view.is_empty() {
            return Err(ConfigError::Validation(
                "site.default_view cannot be empty".to_owned(),
            ));
        }

        Ok(())
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(default_book) = &settings.default_book {
            self.site.default_book.clone_from(default_book);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache.enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Default config: one `docs` book below `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig {
                default_book: "docs".to_owned(),
                default_view: DEFAULT_VIEW.to_owned(),
            },
            books: vec![BookConfig {
                name: "docs".to_owned(),
                source_dir: base.join("docs"),
                domain: None,
                enabled: true,
            }],
            cache: CacheConfig {
                enabled: true,
                dir: base.join(".folio").join("cache"),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn resolve(raw: ConfigRaw, config_dir: &Path) -> Self {
        let books: Vec<BookConfig> = raw
            .books
            .into_iter()
            .map(|book| BookConfig {
                source_dir: config_dir.join(&book.source_dir),
                name: book.name,
                domain: book.domain,
                enabled: book.enabled.unwrap_or(true),
            })
            .collect();

        let default_book = raw
            .site
            .default_book
            .or_else(|| books.first().map(|book| book.name.clone()))
            .unwrap_or_default();

        Self {
            site: SiteConfig {
                default_book,
                default_view: raw
                    .site
                    .default_view
                    .unwrap_or_else(|| DEFAULT_VIEW.to_owned()),
            },
            books,
            cache: CacheConfig {
                enabled: raw.cache.enabled.unwrap_or(true),
                dir: config_dir.join(".folio").join("cache"),
            },
            config_path: None,
        }
    }
}

impl ConfigRaw {
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for book in &mut self.books {
            book.source_dir = expand::expand_env(&book.source_dir, "books.source_dir")?;
            if let Some(domain) = &book.domain {
                book.domain = Some(expand::expand_env(domain, "books.domain")?);
            }
        }
        Ok(())
    }
}
