//! Site configuration from menuedit.toml
//!
//! The configuration names every editable page and the locator cascades used
//! to find sections, containers, items and fields on it. Shared cascades live
//! under `[locators]`; a page may override any of them in `[pages.locators]`.

use crate::locator::{Cascade, Locator, LocatorError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the site directory when no config is given
pub const CONFIG_FILE_NAME: &str = "menuedit.toml";

/// Built-in configuration for the standard menu site
const EMBEDDED_CONFIG: &str = include_str!("defaults/site.toml");

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Path of the weekly offers JSON document, relative to the site root
    #[serde(default = "default_offers_file")]
    pub offers_file: String,

    /// Locator cascades shared by all pages
    pub locators: LocatorLists,

    /// Editable menu pages, in navigation order
    #[serde(default)]
    pub pages: Vec<PageDef>,
}

/// Ordered locator pattern lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorLists {
    /// Item container candidates inside a section
    pub containers: Vec<String>,
    /// Item node candidates inside a container
    pub items: Vec<String>,
    /// Name slot candidates inside an item
    pub names: Vec<String>,
    /// Description slot candidates inside an item
    pub descriptions: Vec<String>,
    /// Price group candidates inside an item
    pub price_groups: Vec<String>,
    /// Slots inside a price group
    pub price_group_slots: Vec<String>,
    /// Standalone price slot candidates inside an item
    pub prices: Vec<String>,
    /// Column label nodes inside a section
    pub header_labels: Vec<String>,
    /// Section heading candidates
    pub titles: Vec<String>,
    /// Case-insensitive pattern tested against class names to spot price-like nodes
    #[serde(default = "default_price_like_pattern")]
    pub price_like_pattern: String,
}

/// One editable page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDef {
    /// Stable identifier used on the command line and in section ids
    pub id: String,

    /// Human-readable page name
    pub label: String,

    /// Document file name, relative to the site root
    pub file: String,

    /// Anchor locator matching each section block
    pub sections: String,

    /// Per-page overrides of the shared locator lists
    #[serde(default)]
    pub locators: LocatorOverrides,
}

/// Optional replacements for the shared lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocatorOverrides {
    pub containers: Option<Vec<String>>,
    pub items: Option<Vec<String>>,
    pub names: Option<Vec<String>>,
    pub descriptions: Option<Vec<String>>,
    pub price_groups: Option<Vec<String>>,
    pub price_group_slots: Option<Vec<String>>,
    pub prices: Option<Vec<String>>,
    pub header_labels: Option<Vec<String>>,
    pub titles: Option<Vec<String>>,
    pub price_like_pattern: Option<String>,
}

fn default_offers_file() -> String {
    "offers.json".to_string()
}

fn default_price_like_pattern() -> String {
    "price|amount".to_string()
}

/// A page definition with every cascade compiled
#[derive(Debug, Clone)]
pub struct PageProfile {
    pub id: String,
    pub label: String,
    pub file: String,
    pub anchor: Locator,
    pub containers: Cascade,
    pub items: Cascade,
    pub names: Cascade,
    pub descriptions: Cascade,
    pub price_groups: Cascade,
    pub price_group_slots: Cascade,
    pub prices: Cascade,
    pub header_labels: Cascade,
    pub titles: Cascade,
    pub price_like: Regex,
}

impl SiteConfig {
    /// Load configuration from a menuedit.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(SiteConfig)` - Parsed and validated configuration
    /// * `Err(ConfigError)` - Error reading, parsing or compiling the configuration
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Self::from_toml(&content)
    }

    /// The configuration compiled into the binary
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(EMBEDDED_CONFIG)
    }

    /// Resolve the configuration for a site
    ///
    /// # Parameters
    /// * `site_root` - Site directory, searched for menuedit.toml
    /// * `explicit` - Configuration path given by the user, if any
    ///
    /// # Returns
    /// * `Ok(SiteConfig)` - The explicit file, else the site's file, else the embedded default
    /// * `Err(ConfigError)` - The chosen file could not be loaded
    pub fn resolve(site_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = site_root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::info!("Using site configuration {}", candidate.display());
            Self::load(candidate)
        } else {
            log::info!("No {} in {}, using built-in layout", CONFIG_FILE_NAME, site_root.display());
            Self::embedded()
        }
    }

    /// Parse configuration text and validate every page's locators
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.profiles()?;
        Ok(config)
    }

    /// Look up a page definition by id
    pub fn page(&self, id: &str) -> Option<&PageDef> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Compile the profile for one page
    ///
    /// # Returns
    /// * `Ok(PageProfile)` - Page definition with compiled cascades
    /// * `Err(ConfigError)` - Unknown page id or invalid pattern
    pub fn profile(&self, id: &str) -> Result<PageProfile, ConfigError> {
        let def = self
            .page(id)
            .ok_or_else(|| ConfigError::UnknownPage(id.to_string()))?;
        self.compile(def)
    }

    /// Compile profiles for every page, in configuration order
    pub fn profiles(&self) -> Result<Vec<PageProfile>, ConfigError> {
        self.pages.iter().map(|def| self.compile(def)).collect()
    }

    fn compile(&self, def: &PageDef) -> Result<PageProfile, ConfigError> {
        let shared = &self.locators;
        let local = &def.locators;
        let cascade = |field: &'static str,
                       own: &Option<Vec<String>>,
                       fallback: &[String]|
         -> Result<Cascade, ConfigError> {
            Cascade::compile(own.as_deref().unwrap_or(fallback)).map_err(|source| {
                ConfigError::InvalidLocator {
                    page: def.id.clone(),
                    field,
                    source,
                }
            })
        };

        let anchor = Locator::parse(&def.sections).map_err(|source| ConfigError::InvalidLocator {
            page: def.id.clone(),
            field: "sections",
            source,
        })?;

        let pattern = local
            .price_like_pattern
            .as_deref()
            .unwrap_or(&shared.price_like_pattern);
        let price_like = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern {
                page: def.id.clone(),
                reason: e.to_string(),
            })?;

        Ok(PageProfile {
            id: def.id.clone(),
            label: def.label.clone(),
            file: def.file.clone(),
            anchor,
            containers: cascade("containers", &local.containers, &shared.containers)?,
            items: cascade("items", &local.items, &shared.items)?,
            names: cascade("names", &local.names, &shared.names)?,
            descriptions: cascade("descriptions", &local.descriptions, &shared.descriptions)?,
            price_groups: cascade("price_groups", &local.price_groups, &shared.price_groups)?,
            price_group_slots: cascade(
                "price_group_slots",
                &local.price_group_slots,
                &shared.price_group_slots,
            )?,
            prices: cascade("prices", &local.prices, &shared.prices)?,
            header_labels: cascade("header_labels", &local.header_labels, &shared.header_labels)?,
            titles: cascade("titles", &local.titles, &shared.titles)?,
            price_like,
        })
    }
}

/// Errors that can occur when loading site configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error when reading the file
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// No page with this id is configured
    #[error("Unknown page '{0}'")]
    UnknownPage(String),

    /// A locator pattern failed to compile
    #[error("Page '{page}', {field}: {source}")]
    InvalidLocator {
        page: String,
        field: &'static str,
        #[source]
        source: LocatorError,
    },

    /// The price-like pattern is not a valid regular expression
    #[error("Page '{page}', price_like_pattern: {reason}")]
    InvalidPattern { page: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_has_all_pages() {
        let config = SiteConfig::embedded().unwrap();

        let ids: Vec<&str> = config.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["signature", "classic", "spirits", "whisky", "wine", "beer", "misc"]
        );
        assert_eq!(config.offers_file, "offers.json");
        assert_eq!(config.profiles().unwrap().len(), 7);
    }

    #[test]
    fn test_page_override_replaces_shared_list() {
        let toml_content = r#"
[locators]
containers = [".table"]
items = [".item"]
names = [".name"]
descriptions = []
price_groups = []
price_group_slots = []
prices = [".price"]
header_labels = []
titles = ["h2"]

[[pages]]
id = "drinks"
label = "Drinks"
file = "drinks.html"
sections = "section"

[pages.locators]
items = ["> li", ".row"]
price_like_pattern = "cost"
"#;

        let config = SiteConfig::from_toml(toml_content).unwrap();
        let profile = config.profile("drinks").unwrap();

        assert_eq!(config.offers_file, "offers.json");
        assert_eq!(profile.items.len(), 2);
        assert_eq!(profile.names.len(), 1);
        assert!(profile.price_like.is_match("item-COST"));
        assert!(!profile.price_like.is_match("item-price"));
    }

    #[test]
    fn test_unknown_page_is_reported() {
        let config = SiteConfig::embedded().unwrap();
        assert!(matches!(
            config.profile("desserts"),
            Err(ConfigError::UnknownPage(id)) if id == "desserts"
        ));
    }

    #[test]
    fn test_invalid_selector_fails_at_load() {
        let toml_content = r#"
[locators]
containers = []
items = [".item["]
names = []
descriptions = []
price_groups = []
price_group_slots = []
prices = []
header_labels = []
titles = []

[[pages]]
id = "broken"
label = "Broken"
file = "broken.html"
sections = "section"
"#;

        let err = SiteConfig::from_toml(toml_content).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidLocator { field: "items", .. }
        ));
    }

    #[test]
    fn test_resolve_falls_back_to_embedded() {
        let dir = std::env::temp_dir().join("menuedit-config-missing");
        let config = SiteConfig::resolve(&dir, None).unwrap();
        assert_eq!(config.pages.len(), 7);
    }
}
