use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// --- Built-in configuration (overridden by rss-books.toml when present) ---

pub const CONFIG_FILE: &str = "rss-books.toml";
pub const RSS_FEED_URL: &str =
    "https://bookfeed.io/feed/idAyKAmz8WOc-------------------urP5cAp20lcB49hNA0/feed.xml";
pub const OUTPUT_HTML_FILE: &str = "output.html";
pub const ABR_SEARCH_URL: &str = "http://yourservername:8788/search?q={title}&region=us";
pub const LANGUAGE_FILTER: &[&str] = &["en"];
pub const EXCLUDE_TITLES: &[&str] = &["No Title", "Untitled"];
pub const USER_AGENT: &str = "Mozilla/5.0";
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const RECENT_WINDOW_DAYS: i64 = 30;
pub const MAX_RECENT_WINDOW_DAYS: i64 = 36_500;

/// Placeholder substituted with the encoded title in the ABR search template.
pub const TITLE_PLACEHOLDER: &str = "{title}";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub filter: FilterConfig,
    pub dedupe: DedupeConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub user_agent: String,
    pub request_timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: RSS_FEED_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            request_timeout_ms: REQUEST_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Allowed language tags. Empty disables language filtering.
    pub languages: Vec<String>,
    /// Case-insensitive substrings; a title containing any of them is dropped.
    pub exclude_titles: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            languages: LANGUAGE_FILTER.iter().map(|s| s.to_string()).collect(),
            exclude_titles: EXCLUDE_TITLES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DedupeConfig {
    pub enabled: bool,
    /// Minimum similarity score for two books sharing a work key to merge.
    pub same_work_threshold: f64,
    /// Title token-set ratio needed for the fuzzy rescue path.
    pub title_rescue: f64,
    /// Author token-sort ratio needed for the fuzzy rescue path.
    pub author_rescue: f64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            same_work_threshold: 0.65,
            title_rescue: 0.8,
            author_rescue: 0.9,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub abr_search_url: String,
    pub recent_window_days: i64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(OUTPUT_HTML_FILE),
            abr_search_url: ABR_SEARCH_URL.to_string(),
            recent_window_days: RECENT_WINDOW_DAYS,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using built-in defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed.url.trim().is_empty() {
            anyhow::bail!("feed.url cannot be empty");
        }
        if !self.output.abr_search_url.contains(TITLE_PLACEHOLDER) {
            anyhow::bail!(
                "output.abr_search_url must contain {} (got {:?})",
                TITLE_PLACEHOLDER,
                self.output.abr_search_url
            );
        }
        if !(0..=MAX_RECENT_WINDOW_DAYS).contains(&self.output.recent_window_days) {
            anyhow::bail!(
                "output.recent_window_days must be between 0 and {} (got {})",
                MAX_RECENT_WINDOW_DAYS,
                self.output.recent_window_days
            );
        }
        Ok(())
    }
}
