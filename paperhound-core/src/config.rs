// Pipeline configuration: target site, selectors, throttle and the category table

use crate::error::{CoreError, Result};
use paperhound_scraper::fetcher::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use paperhound_scraper::{Category, ListingSelectors};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://exams.example.org/";
pub const DEFAULT_LINK_BASE: &str = "https://exams.example.org";
pub const DEFAULT_PAGE_DELAY_MS: u64 = 1000;
pub const COOKIE_ENV: &str = "PAPERHOUND_COOKIE";

/// Built-in category table: (display name, query tag, last page index).
const DEFAULT_CATEGORIES: &[(&str, &str, u32)] = &[
    ("Mathematics", "math", 80),
    ("Physics", "physics", 20),
    ("Chemistry", "chemistry", 5),
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, tag, max_page)| Category::new(*name, *tag, *max_page))
        .collect()
}

/// Everything a run needs except the session cookie, which is supplied
/// separately by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub base_url: String,
    pub link_base: String,
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub stop_on_empty: bool,
    pub selectors: ListingSelectors,
    pub categories: Vec<Category>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            stop_on_empty: false,
            selectors: ListingSelectors::default(),
            categories: default_categories(),
        }
    }
}

impl PipelineConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Total page requests a full run over `categories` issues.
    pub fn total_pages(categories: &[Category]) -> u64 {
        categories.iter().map(Category::page_count).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(CoreError::Config("category table is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::Config("timeout_secs must be at least 1".to_string()));
        }
        for (idx, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() || category.tag.trim().is_empty() {
                return Err(CoreError::Config(format!(
                    "category #{} needs both a name and a tag",
                    idx + 1
                )));
            }
            if self.categories[..idx]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&category.name))
            {
                return Err(CoreError::Config(format!(
                    "duplicate category name '{}'",
                    category.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve `keys` (names or tags) against the table, keeping table order.
    /// An empty key list selects every category.
    pub fn select_categories(&self, keys: &[String]) -> Result<Vec<Category>> {
        if keys.is_empty() {
            return Ok(self.categories.clone());
        }

        if let Some(unknown) = keys
            .iter()
            .find(|key| !self.categories.iter().any(|c| c.matches(key)))
        {
            return Err(CoreError::UnknownCategory(unknown.clone()));
        }

        Ok(self
            .categories
            .iter()
            .filter(|c| keys.iter().any(|key| c.matches(key)))
            .cloned()
            .collect())
    }
}

/// Load a pipeline config from TOML or JSON, chosen by file extension.
/// Files without a recognised extension are tried as TOML, then JSON.
pub fn load_config_from(path: &Path) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let config = match ext.as_str() {
        "toml" => parse_toml(&content)?,
        "json" => parse_json(&content)?,
        _ => match parse_toml(&content) {
            Ok(config) => config,
            Err(toml_err) => parse_json(&content).map_err(|_| toml_err)?,
        },
    };

    config.validate()?;
    Ok(config)
}

fn parse_toml(s: &str) -> Result<PipelineConfig> {
    Ok(toml::from_str(s)?)
}

fn parse_json(s: &str) -> Result<PipelineConfig> {
    Ok(serde_json::from_str(s)?)
}
