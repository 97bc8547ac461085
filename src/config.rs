//! User configuration stored as YAML under `~/.shiori/`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_CONTENT_RATINGS, DEFAULT_COVER_URL, DEFAULT_LANGUAGE,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT_SECS, HOME_LIMIT, ITEMS_PER_PAGE, MANGA_PAGE_MAX,
};

const CONFIG_FILE: &str = "config.yaml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API endpoint
    pub api_base_url: String,
    pub cover_base_url: String,
    /// Translation language of listed chapters
    pub language: String,
    pub content_ratings: Vec<String>,
    /// Per-item requests allowed in flight during a fan-out
    pub max_concurrency: usize,
    pub timeout_secs: u64,
    /// Manga fetched for the home grid
    pub home_limit: u32,
    pub items_per_page: usize,
    /// Start the reader in data-saver mode
    pub data_saver: bool,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: String::from(DEFAULT_API_URL),
            cover_base_url: String::from(DEFAULT_COVER_URL),
            language: String::from(DEFAULT_LANGUAGE),
            content_ratings: DEFAULT_CONTENT_RATINGS.iter().map(|s| s.to_string()).collect(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            home_limit: HOME_LIMIT,
            items_per_page: ITEMS_PER_PAGE,
            data_saver: false,
            log_file: config_dir().join("shiori.log"),
        }
    }
}

/// `~/.shiori`, or `./.shiori` when there is no home directory
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shiori")
}

fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path())
    }

    /// Missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Replace values that would make the client unusable
    pub fn normalized(mut self) -> Self {
        if self.max_concurrency == 0 {
            self.max_concurrency = 1;
        }
        self.home_limit = self.home_limit.clamp(1, MANGA_PAGE_MAX);
        if self.items_per_page == 0 {
            self.items_per_page = ITEMS_PER_PAGE;
        }
        if self.language.trim().is_empty() {
            self.language = String::from(DEFAULT_LANGUAGE);
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }
}
