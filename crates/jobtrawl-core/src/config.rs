//! Configuration management for jobtrawl.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult, CoreError};
use crate::types::{SearchQuery, Seniority, WorkplaceMode};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/jobtrawl/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// What to search for
    pub search: SearchConfig,
    /// Traversal limits and timeouts
    pub crawl: CrawlConfig,
    /// Delay cadence between browser actions
    pub pacing: PacingConfig,
    /// Browser launch settings
    pub browser: BrowserConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    /// Returns error if the file is missing, unreadable, or not valid TOML.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration (default location or `path`) with environment overrides.
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Supports the following variables:
    /// - `JOBTRAWL_SEARCH_TERM`: search keywords
    /// - `JOBTRAWL_GEOID`: location identifier
    /// - `JOBTRAWL_MAX_PAGES`: page budget
    /// - `JOBTRAWL_DELAY_SECONDS`: base delay between result pages
    /// - `JOBTRAWL_HEADLESS`: browser headless mode (true/false)
    /// - `JOBTRAWL_USER_DATA_DIR`: browser profile holding a signed-in session
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(term) = lookup("JOBTRAWL_SEARCH_TERM") {
            tracing::debug!("Override search.term from env: {}", term);
            self.search.term = term;
        }

        if let Some(geo_id) = lookup("JOBTRAWL_GEOID").and_then(|v| v.parse().ok()) {
            self.search.location_id = geo_id;
            tracing::debug!("Override search.location_id from env: {}", geo_id);
        }

        if let Some(pages) = lookup("JOBTRAWL_MAX_PAGES").and_then(|v| v.parse().ok()) {
            self.search.max_pages = pages;
            tracing::debug!("Override search.max_pages from env: {}", pages);
        }

        if let Some(secs) = lookup("JOBTRAWL_DELAY_SECONDS").and_then(|v| v.parse::<u64>().ok()) {
            let millis = secs.saturating_mul(1000);
            self.pacing.between_pages_ms = millis;
            tracing::debug!("Override pacing.between_pages_ms from env: {}", millis);
        }

        if let Some(headless) = lookup("JOBTRAWL_HEADLESS").and_then(|v| v.parse().ok()) {
            self.browser.headless = headless;
            tracing::debug!("Override browser.headless from env: {}", headless);
        }

        if let Some(dir) = lookup("JOBTRAWL_USER_DATA_DIR") {
            tracing::debug!("Override browser.user_data_dir from env: {}", dir);
            self.browser.user_data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Check values that would make a crawl meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.crawl.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "crawl.page_size".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        if self.crawl.scroll_stages.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return Err(ConfigError::InvalidValue {
                field: "crawl.scroll_stages".to_string(),
                reason: "fractions must be within 0.0..=1.0".to_string(),
            });
        }

        let jitter = self.pacing.between_pages_jitter;
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pacing.between_pages_jitter".to_string(),
                reason: "jitter must be a finite non-negative factor".to_string(),
            });
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/jobtrawl/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "jobtrawl", "jobtrawl").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search keywords
    pub term: String,
    /// Site geo identifier
    pub location_id: u64,
    /// Workplace filter (empty = any)
    pub workplace_modes: Vec<WorkplaceMode>,
    /// Experience level filter (empty = any)
    pub seniorities: Vec<Seniority>,
    /// Maximum number of result pages to visit
    pub max_pages: usize,
}

impl SearchConfig {
    /// Build the validated query described by this section.
    pub fn to_query(&self) -> Result<SearchQuery, CoreError> {
        Ok(SearchQuery::new(self.term.clone(), self.location_id)?
            .with_workplace_modes(self.workplace_modes.iter().copied())
            .with_seniorities(self.seniorities.iter().copied()))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            term: "Data Engineer".to_string(),
            location_id: 90_009_834,
            workplace_modes: Vec::new(),
            seniorities: Vec::new(),
            max_pages: 3,
        }
    }
}

/// Traversal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Jobs section root; search and posting URLs are built from it
    pub base_url: String,
    /// Items per result page, used for the page offset parameter
    pub page_size: usize,
    /// Bounded wait for elements to appear, in seconds
    pub element_timeout_secs: u64,
    /// Bounded wait for the previous item list to go stale, in seconds
    pub stale_timeout_secs: u64,
    /// Extra navigation attempts before a page load is fatal
    pub load_retries: u32,
    /// Pause after this many extracted items
    pub items_per_pause: usize,
    /// Scroll fractions applied before enumerating items
    pub scroll_stages: Vec<f64>,
    /// Optional wall-clock cap for a whole crawl, in seconds
    pub max_duration_secs: Option<u64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.linkedin.com/jobs/".to_string(),
            page_size: 25,
            element_timeout_secs: 10,
            stale_timeout_secs: 10,
            load_retries: 1,
            items_per_pause: 3,
            scroll_stages: vec![0.3, 0.6, 1.0],
            max_duration_secs: None,
        }
    }
}

/// Delay cadence. Each delay is `base + U(0, base * jitter)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Base wait after navigation and scroll stages, in milliseconds
    pub page_load_ms: u64,
    /// Base wait between item batches, in milliseconds
    pub between_items_ms: u64,
    /// Base wait between result pages, in milliseconds
    pub between_pages_ms: u64,
    /// Jitter multiplier for the between-pages delay
    pub between_pages_jitter: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_load_ms: 1500,
            between_items_ms: 2000,
            between_pages_ms: 3000,
            between_pages_jitter: 2.0,
        }
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width (ignored when the fingerprint is randomized)
    pub window_width: u32,
    /// Browser window height (ignored when the fingerprint is randomized)
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Profile directory holding an already signed-in session
    pub user_data_dir: Option<PathBuf>,
    /// Explicit Chrome/Chromium binary
    pub chrome_executable: Option<PathBuf>,
    /// Pick a random desktop user agent and viewport at launch
    pub randomize_fingerprint: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
            user_data_dir: None,
            chrome_executable: None,
            randomize_fingerprint: true,
        }
    }
}
