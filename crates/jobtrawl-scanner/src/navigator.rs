//! Result page traversal.
//!
//! One visit walks a page through `Init -> LoadingPage -> ScrollingToLoad ->
//! EnumeratingItems -> ExtractingItems -> LocatingNextPage` and ends in
//! `Done` or `Failed`. Advancing to the following page is a separate step so
//! the caller decides whether the next control is clicked at all.

use crate::error::{Result, ScanError};
use crate::extractor::RecordExtractor;
use crate::pacing::{DelayKind, Pacer};
use crate::selectors::SelectorSet;
use crate::settings::CrawlSettings;
use crate::url_builder::build_search_url;
use jobtrawl_browser::{BrowserActions, BrowserError};
use jobtrawl_core::{Record, SearchQuery};
use std::fmt;
use std::time::Duration;

/// Pagination controls and the current detail view are probed once, without waiting.
const SINGLE_PROBE: Duration = Duration::ZERO;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Init,
    LoadingPage,
    ScrollingToLoad,
    EnumeratingItems,
    ExtractingItems,
    LocatingNextPage,
    Done,
    Failed,
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "Init",
            Self::LoadingPage => "LoadingPage",
            Self::ScrollingToLoad => "ScrollingToLoad",
            Self::EnumeratingItems => "EnumeratingItems",
            Self::ExtractingItems => "ExtractingItems",
            Self::LocatingNextPage => "LocatingNextPage",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// How the browser reached the page about to be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Navigate to the built page URL
    ByUrl,
    /// The previous page's next control was clicked
    ByPaginationClick {
        /// Whether the previous item list detached after the click
        prior_list_stale: bool,
    },
}

/// Snapshot of one visited result page.
#[derive(Debug)]
pub struct PageState<H> {
    pub page_index: usize,
    pub item_handles: Vec<H>,
    /// Resolved in `LocatingNextPage`
    pub has_next: bool,
}

/// Outcome of one page visit.
#[derive(Debug)]
pub struct PageVisit<H> {
    pub state: PageState<H>,
    /// One record per item handle, in page order
    pub records: Vec<Record>,
    next_control: Option<H>,
}

/// Drives one result page at a time through the traversal states.
pub struct PageNavigator<'a, D: BrowserActions, P: Pacer> {
    driver: &'a D,
    pacer: &'a P,
    selectors: &'a SelectorSet,
    settings: &'a CrawlSettings,
}

impl<'a, D: BrowserActions, P: Pacer> PageNavigator<'a, D, P> {
    pub fn new(
        driver: &'a D,
        pacer: &'a P,
        selectors: &'a SelectorSet,
        settings: &'a CrawlSettings,
    ) -> Self {
        Self {
            driver,
            pacer,
            selectors,
            settings,
        }
    }

    /// Load, render, enumerate and extract one result page, then look for a next control.
    pub async fn visit(
        &self,
        query: &SearchQuery,
        page_index: usize,
        arrival: Arrival,
    ) -> Result<PageVisit<D::Handle>> {
        let mut state = NavState::Init;
        match self.walk(&mut state, query, page_index, arrival).await {
            Ok(visit) => {
                let terminal = if visit.state.has_next {
                    NavState::LoadingPage
                } else {
                    NavState::Done
                };
                Self::enter(&mut state, terminal, page_index);
                Ok(visit)
            }
            Err(e) => {
                Self::enter(&mut state, NavState::Failed, page_index);
                tracing::warn!("Result page {} failed: {}", page_index, e);
                Err(e)
            }
        }
    }

    /// Click the next control found by [`visit`](Self::visit) and wait for the old list to detach.
    ///
    /// Without a next control, or when the click fails, the following page is
    /// reached by URL instead.
    pub async fn advance(&self, visit: &PageVisit<D::Handle>) -> Result<Arrival> {
        let page_index = visit.state.page_index;
        let Some(next) = visit.next_control.as_ref() else {
            return Ok(Arrival::ByUrl);
        };

        if let Err(e) = self.driver.click(next).await {
            if e.is_session_lost() {
                return Err(ScanError::from_browser(page_index, e));
            }
            tracing::warn!("Next control on page {} did not respond: {}", page_index, e);
            return Ok(Arrival::ByPaginationClick {
                prior_list_stale: false,
            });
        }

        let prior_list_stale = match visit.state.item_handles.first() {
            Some(first) => match self
                .driver
                .wait_for_stale(first, self.settings.stale_timeout)
                .await
            {
                Ok(stale) => stale,
                Err(e) if e.is_session_lost() => return Err(ScanError::from_browser(page_index, e)),
                Err(e) => {
                    tracing::debug!("Staleness check on page {} failed: {}", page_index, e);
                    false
                }
            },
            None => false,
        };

        Ok(Arrival::ByPaginationClick { prior_list_stale })
    }

    async fn walk(
        &self,
        state: &mut NavState,
        query: &SearchQuery,
        page_index: usize,
        arrival: Arrival,
    ) -> Result<PageVisit<D::Handle>> {
        Self::enter(state, NavState::LoadingPage, page_index);
        self.load(query, page_index, arrival).await?;

        Self::enter(state, NavState::ScrollingToLoad, page_index);
        self.scroll_to_load(page_index).await?;

        Self::enter(state, NavState::EnumeratingItems, page_index);
        let item_handles = self.enumerate_items(page_index).await?;
        tracing::debug!("Page {} rendered {} items", page_index, item_handles.len());

        Self::enter(state, NavState::ExtractingItems, page_index);
        let records = self.extract_items(page_index, &item_handles).await?;

        Self::enter(state, NavState::LocatingNextPage, page_index);
        let next_control = if item_handles.is_empty() {
            None
        } else {
            self.locate_next(page_index).await?
        };

        Ok(PageVisit {
            state: PageState {
                page_index,
                item_handles,
                has_next: next_control.is_some(),
            },
            records,
            next_control,
        })
    }

    fn enter(state: &mut NavState, next: NavState, page_index: usize) {
        tracing::debug!("Page {}: {} -> {}", page_index, state, next);
        *state = next;
    }

    async fn load(&self, query: &SearchQuery, page_index: usize, arrival: Arrival) -> Result<()> {
        if let Arrival::ByPaginationClick { prior_list_stale } = arrival {
            if prior_list_stale {
                match self.wait_for_any(&self.selectors.results_list).await {
                    Ok(_) => return Ok(()),
                    Err(e) if e.is_session_lost() => {
                        return Err(ScanError::from_browser(page_index, e))
                    }
                    Err(e) => tracing::warn!(
                        "Result list for page {} did not appear after click ({}), loading by URL",
                        page_index,
                        e
                    ),
                }
            } else {
                tracing::warn!(
                    "Previous list did not go stale, loading page {} by URL",
                    page_index
                );
            }
        }

        let url = build_search_url(
            &self.settings.base_url,
            query,
            page_index,
            self.settings.page_size,
        );
        self.navigate(&url, page_index).await
    }

    /// Navigate with the configured number of extra attempts.
    pub(crate) async fn navigate(&self, url: &str, page_index: usize) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.driver.navigate(url).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_session_lost() || attempt >= self.settings.load_retries => {
                    return Err(ScanError::from_browser(page_index, e));
                }
                Err(e) => {
                    attempt += 1;
                    tracing::warn!(
                        "Loading page {} failed (attempt {}): {}",
                        page_index,
                        attempt,
                        e
                    );
                    self.pacer.delay(DelayKind::PageLoad).await;
                }
            }
        }
    }

    /// Staged scrolls so lazily rendered items exist before enumeration.
    pub(crate) async fn scroll_to_load(&self, page_index: usize) -> Result<()> {
        for &stage in &self.settings.scroll_stages {
            if let Err(e) = self.driver.scroll_viewport(stage).await {
                if e.is_session_lost() {
                    return Err(ScanError::from_browser(page_index, e));
                }
                tracing::debug!("Scroll to {:.0}% failed: {}", stage * 100.0, e);
            }
            self.pacer.delay(DelayKind::PageLoad).await;
        }
        Ok(())
    }

    async fn enumerate_items(&self, page_index: usize) -> Result<Vec<D::Handle>> {
        let items = self.snapshot_items(page_index).await?;
        if !items.is_empty() {
            return Ok(items);
        }

        tracing::debug!("No items on page {} yet, retrying once", page_index);
        self.pacer.delay(DelayKind::PageLoad).await;
        self.snapshot_items(page_index).await
    }

    async fn snapshot_items(&self, page_index: usize) -> Result<Vec<D::Handle>> {
        let list = match self.wait_for_any(&self.selectors.results_list).await {
            Ok(list) => list,
            Err(e) if e.is_session_lost() => return Err(ScanError::from_browser(page_index, e)),
            Err(e) => {
                tracing::debug!("Result list missing on page {}: {}", page_index, e);
                return Ok(Vec::new());
            }
        };
        self.children(page_index, &list, &self.selectors.item_card)
            .await
    }

    /// Descendants of `scope` for the first selector that yields any.
    pub(crate) async fn children(
        &self,
        page_index: usize,
        scope: &D::Handle,
        selectors: &[String],
    ) -> Result<Vec<D::Handle>> {
        for selector in selectors {
            match self.driver.find_all_elements(scope, selector).await {
                Ok(found) if !found.is_empty() => return Ok(found),
                Ok(_) => {}
                Err(e) if e.is_session_lost() => return Err(ScanError::from_browser(page_index, e)),
                Err(e) => tracing::debug!("Selector {} failed: {}", selector, e),
            }
        }
        Ok(Vec::new())
    }

    /// Extract every card in order, opening each detail view first.
    ///
    /// Items are never dropped; only a lost session ends the page early.
    pub(crate) async fn extract_items(
        &self,
        page_index: usize,
        cards: &[D::Handle],
    ) -> Result<Vec<Record>> {
        let extractor = RecordExtractor::new(self.driver, self.selectors, &self.settings.base_url);
        let per_pause = self.settings.items_per_pause;
        let mut records = Vec::with_capacity(cards.len());

        for (position, card) in cards.iter().enumerate() {
            if per_pause > 0 && position > 0 && position % per_pause == 0 {
                self.pacer.delay(DelayKind::BetweenItems).await;
            }

            let detail = match self.open_detail(card).await {
                Ok(detail) => Some(detail),
                Err(e) if e.is_session_lost() => return Err(ScanError::from_browser(page_index, e)),
                Err(e) => {
                    tracing::warn!(
                        "Detail view for item {} on page {} unavailable: {}",
                        position,
                        page_index,
                        e
                    );
                    None
                }
            };

            records.push(extractor.extract(card, detail.as_ref()).await);
        }

        Ok(records)
    }

    /// Click a card and wait for a detail view that belongs to it.
    ///
    /// A pane left over from the previous item must detach first; if it
    /// never does, the view still shows that item and is rejected.
    async fn open_detail(&self, card: &D::Handle) -> std::result::Result<D::Handle, BrowserError> {
        let previous = self.current_detail().await?;
        self.driver.click(card).await?;

        if let Some(previous) = previous {
            if !self
                .driver
                .wait_for_stale(&previous, self.settings.stale_timeout)
                .await?
            {
                return Err(BrowserError::Timeout(
                    "detail view still shows the previous item".to_string(),
                ));
            }
        }

        self.wait_for_any(&self.selectors.detail_root).await
    }

    /// The detail view currently in the document, probed without waiting.
    async fn current_detail(&self) -> std::result::Result<Option<D::Handle>, BrowserError> {
        for selector in &self.selectors.detail_root {
            match self.driver.wait_for_element(selector, None, SINGLE_PROBE).await {
                Ok(found) => return Ok(Some(found)),
                Err(e) if e.is_session_lost() => return Err(e),
                Err(_) => {}
            }
        }
        Ok(None)
    }

    /// Wait for the first selector in the chain that appears in the document.
    pub(crate) async fn wait_for_any(
        &self,
        selectors: &[String],
    ) -> std::result::Result<D::Handle, BrowserError> {
        let mut last = BrowserError::SelectorNotFound("empty selector chain".to_string());
        for selector in selectors {
            match self
                .driver
                .wait_for_element(selector, None, self.settings.element_timeout)
                .await
            {
                Ok(found) => return Ok(found),
                Err(e) if e.is_session_lost() => return Err(e),
                Err(e) => last = e,
            }
        }
        Err(last)
    }

    /// Numbered button for the following page, then next buttons, then labelled pagination buttons.
    async fn locate_next(&self, page_index: usize) -> Result<Option<D::Handle>> {
        let numbered = self.selectors.numbered_page(page_index + 2);
        for selector in numbered.iter().chain(&self.selectors.next_page_button) {
            if let Some(control) = self.probe(page_index, selector).await? {
                tracing::debug!("Next control for page {} found by {}", page_index, selector);
                return Ok(Some(control));
            }
        }

        for container_selector in &self.selectors.pagination_container {
            let Some(container) = self.probe(page_index, container_selector).await? else {
                continue;
            };
            let buttons = self
                .children(
                    page_index,
                    &container,
                    std::slice::from_ref(&self.selectors.pagination_button),
                )
                .await?;
            for button in buttons {
                let label = match self.driver.text(&button).await {
                    Ok(label) => label,
                    Err(e) if e.is_session_lost() => {
                        return Err(ScanError::from_browser(page_index, e))
                    }
                    Err(_) => continue,
                };
                if self.selectors.next_labels.iter().any(|l| l == label.trim()) {
                    tracing::debug!("Next control for page {} found by label", page_index);
                    return Ok(Some(button));
                }
            }
        }

        tracing::debug!("No next control after page {}", page_index);
        Ok(None)
    }

    /// Single lookup of an enabled element.
    async fn probe(&self, page_index: usize, selector: &str) -> Result<Option<D::Handle>> {
        let element = match self.driver.wait_for_element(selector, None, SINGLE_PROBE).await {
            Ok(element) => element,
            Err(e) if e.is_session_lost() => return Err(ScanError::from_browser(page_index, e)),
            Err(_) => return Ok(None),
        };

        match self.driver.attribute(&element, "disabled").await {
            Ok(Some(_)) => Ok(None),
            Ok(None) => Ok(Some(element)),
            Err(e) if e.is_session_lost() => Err(ScanError::from_browser(page_index, e)),
            Err(_) => Ok(Some(element)),
        }
    }
}
