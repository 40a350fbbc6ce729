//! Public entry point tying navigation, accumulation and extraction to one browser session.

use crate::accumulator::{CrawlLimits, CrawlReport, ResultAccumulator};
use crate::buckets::{self, RecommendedJobs};
use crate::error::{Result, ScanError};
use crate::extractor::RecordExtractor;
use crate::navigator::{Arrival, PageNavigator};
use crate::pacing::{Pacer, PacingController};
use crate::selectors::SelectorSet;
use crate::settings::CrawlSettings;
use jobtrawl_browser::BrowserActions;
use jobtrawl_core::{AppConfig, Record, SearchQuery};
use std::time::Duration;

/// Job search over one exclusively owned browser session.
///
/// Every operation takes `&mut self`: a crawl drives the shared detail pane
/// and cannot interleave with another.
pub struct JobSearch<D, P = PacingController> {
    driver: D,
    pacer: P,
    selectors: SelectorSet,
    settings: CrawlSettings,
}

impl<D: BrowserActions> JobSearch<D, PacingController> {
    /// Build a search with pacing and crawl settings from `config`.
    pub fn from_config(driver: D, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            driver,
            pacer: PacingController::new(&config.pacing),
            selectors: SelectorSet::default(),
            settings: CrawlSettings::from_config(&config.crawl)?,
        })
    }

    /// Crawl up to `max_pages` pages, pausing around `delay` between pages.
    pub async fn search_all_pages(
        &mut self,
        query: &SearchQuery,
        max_pages: usize,
        delay: Duration,
    ) -> CrawlReport {
        let pacer = self.pacer.clone().with_between_pages(delay);
        let mut limits = CrawlLimits::pages(max_pages);
        limits.max_duration = self.settings.max_duration;

        let navigator = PageNavigator::new(&self.driver, &pacer, &self.selectors, &self.settings);
        ResultAccumulator::new(navigator, &pacer)
            .run(query, limits)
            .await
    }
}

impl<D: BrowserActions, P: Pacer> JobSearch<D, P> {
    pub fn new(driver: D, pacer: P) -> Self {
        Self {
            driver,
            pacer,
            selectors: SelectorSet::default(),
            settings: CrawlSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: CrawlSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_selectors(mut self, selectors: SelectorSet) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Release the browser session.
    pub fn into_driver(self) -> D {
        self.driver
    }

    fn navigator(&self) -> PageNavigator<'_, D, P> {
        PageNavigator::new(&self.driver, &self.pacer, &self.selectors, &self.settings)
    }

    /// Records of a single result page, reached by URL.
    pub async fn search(&mut self, query: &SearchQuery, page_index: usize) -> Result<Vec<Record>> {
        let visit = self
            .navigator()
            .visit(query, page_index, Arrival::ByUrl)
            .await?;
        Ok(visit.records)
    }

    /// Crawl consecutive result pages within `limits`.
    pub async fn run(&mut self, query: &SearchQuery, limits: CrawlLimits) -> CrawlReport {
        ResultAccumulator::new(self.navigator(), &self.pacer)
            .run(query, limits)
            .await
    }

    /// Scrape the recommendation board on the jobs home page.
    pub async fn recommended_jobs(&mut self) -> Result<RecommendedJobs> {
        let home = self.settings.base_url.to_string();
        tracing::info!("Scraping recommendation board at {}", home);
        buckets::scrape_board(
            &self.navigator(),
            &home,
            &self.selectors.board_root,
            &self.selectors.board_area,
            &self.selectors.board_item,
        )
        .await
    }

    /// Extract one record from a standalone posting page.
    pub async fn scrape_posting(&mut self, url: &str) -> Result<Record> {
        let navigator = self.navigator();
        navigator.navigate(url, 0).await?;

        let detail = navigator
            .wait_for_any(&self.selectors.detail_root)
            .await
            .map_err(|source| {
                if source.is_session_lost() {
                    ScanError::from_browser(0, source)
                } else {
                    ScanError::ContainerMissing {
                        what: "posting detail view",
                        source,
                    }
                }
            })?;

        let page_url = match self.driver.current_url().await {
            Ok(current) => current,
            Err(e) => {
                tracing::debug!("Current URL unavailable, using requested URL: {}", e);
                url.to_string()
            }
        };

        let extractor = RecordExtractor::new(&self.driver, &self.selectors, &self.settings.base_url);
        Ok(extractor.extract_posting(&page_url, &detail).await)
    }
}
