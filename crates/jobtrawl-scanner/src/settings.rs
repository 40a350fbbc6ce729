use crate::error::{Result, ScanError};
use jobtrawl_core::CrawlConfig;
use std::time::Duration;
use url::Url;

/// Traversal settings resolved from [`CrawlConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSettings {
    /// Jobs section root, always ending in `/`
    pub base_url: Url,
    pub page_size: usize,
    pub element_timeout: Duration,
    pub stale_timeout: Duration,
    pub load_retries: u32,
    pub items_per_pause: usize,
    pub scroll_stages: Vec<f64>,
    pub max_duration: Option<Duration>,
}

impl CrawlSettings {
    pub fn from_config(config: &CrawlConfig) -> Result<Self> {
        let mut raw = config.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| ScanError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url,
            page_size: config.page_size.max(1),
            element_timeout: Duration::from_secs(config.element_timeout_secs),
            stale_timeout: Duration::from_secs(config.stale_timeout_secs),
            load_retries: config.load_retries,
            items_per_pause: config.items_per_pause,
            scroll_stages: config.scroll_stages.clone(),
            max_duration: config.max_duration_secs.map(Duration::from_secs),
        })
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from_config(&CrawlConfig::default()).expect("default base URL is valid")
    }
}
