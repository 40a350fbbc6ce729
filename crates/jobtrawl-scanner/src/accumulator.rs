//! Multi-page crawl policy: page budget, wall-clock cap, early stop, dedup.

use crate::error::ScanError;
use crate::navigator::{Arrival, PageNavigator};
use crate::pacing::{DelayKind, Pacer};
use jobtrawl_browser::BrowserActions;
use jobtrawl_core::{Record, SearchQuery};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Caps applied to one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Maximum number of result pages visited
    pub page_budget: usize,
    /// Wall-clock cap checked after each page
    pub max_duration: Option<Duration>,
}

impl CrawlLimits {
    #[must_use]
    pub fn pages(page_budget: usize) -> Self {
        Self {
            page_budget,
            max_duration: None,
        }
    }

    #[must_use]
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }
}

/// Why a crawl stopped without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The last visited page had no next control
    EndOfResults,
    /// A page rendered no items
    EmptyPage,
    /// More pages exist but the page budget is spent
    PageBudgetExhausted,
    /// More pages exist but the wall-clock cap was reached
    TimeBudgetExhausted,
}

#[derive(Debug)]
pub enum Termination {
    Done(DoneReason),
    Failed(ScanError),
}

/// Everything a crawl produced, including partial results of a failed one.
#[derive(Debug)]
pub struct CrawlReport {
    /// Deduplicated records in discovery order
    pub records: Vec<Record>,
    pub pages_visited: usize,
    pub termination: Termination,
}

impl CrawlReport {
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.termination, Termination::Done(_))
    }

    /// The fatal error that ended the crawl, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ScanError> {
        match &self.termination {
            Termination::Failed(e) => Some(e),
            Termination::Done(_) => None,
        }
    }

    /// Split into the records and the fatal error, if one ended the crawl.
    pub fn into_parts(self) -> (Vec<Record>, Option<ScanError>) {
        match self.termination {
            Termination::Done(_) => (self.records, None),
            Termination::Failed(e) => (self.records, Some(e)),
        }
    }
}

/// Accumulated state of one crawl.
#[derive(Debug)]
pub struct CrawlSession {
    records: Vec<Record>,
    seen: HashSet<String>,
    page_budget: usize,
    pages_visited: usize,
    started: Instant,
}

impl CrawlSession {
    #[must_use]
    pub fn new(page_budget: usize) -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            page_budget,
            pages_visited: 0,
            started: Instant::now(),
        }
    }

    /// Append a page's records, dropping any whose canonical URL was already seen.
    ///
    /// Records without a source URL have no identity and are always kept.
    /// Returns how many records were appended.
    pub fn absorb(&mut self, page: Vec<Record>) -> usize {
        let before = self.records.len();
        for record in page {
            if let Some(key) = record.key() {
                if !self.seen.insert(key.to_string()) {
                    tracing::trace!("Dropping duplicate {}", key);
                    continue;
                }
            }
            self.records.push(record);
        }
        self.pages_visited += 1;
        self.records.len() - before
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    #[must_use]
    pub fn budget_spent(&self) -> bool {
        self.pages_visited >= self.page_budget
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn finish(self, termination: Termination) -> CrawlReport {
        match &termination {
            Termination::Done(reason) => tracing::info!(
                "Crawl done ({:?}): {} records from {} pages",
                reason,
                self.records.len(),
                self.pages_visited
            ),
            Termination::Failed(e) => tracing::error!(
                "Crawl failed after {} records from {} pages: {}",
                self.records.len(),
                self.pages_visited,
                e
            ),
        }

        CrawlReport {
            records: self.records,
            pages_visited: self.pages_visited,
            termination,
        }
    }
}

/// Visits result pages strictly in sequence and folds them into a [`CrawlReport`].
pub struct ResultAccumulator<'a, D: BrowserActions, P: Pacer> {
    navigator: PageNavigator<'a, D, P>,
    pacer: &'a P,
}

impl<'a, D: BrowserActions, P: Pacer> ResultAccumulator<'a, D, P> {
    pub fn new(navigator: PageNavigator<'a, D, P>, pacer: &'a P) -> Self {
        Self { navigator, pacer }
    }

    pub async fn run(&self, query: &SearchQuery, limits: CrawlLimits) -> CrawlReport {
        let mut session = CrawlSession::new(limits.page_budget);
        tracing::info!(
            "Crawling '{}' (geoId {}) for up to {} pages",
            query.term,
            query.location_id,
            limits.page_budget
        );
        if limits.page_budget == 0 {
            return session.finish(Termination::Done(DoneReason::PageBudgetExhausted));
        }

        let mut arrival = Arrival::ByUrl;
        let mut page_index = 0;
        loop {
            let mut visit = match self.navigator.visit(query, page_index, arrival).await {
                Ok(visit) => visit,
                Err(e) => return session.finish(Termination::Failed(e)),
            };

            let yielded = visit.records.len();
            if yielded == 0 {
                session.pages_visited += 1;
                return session.finish(Termination::Done(DoneReason::EmptyPage));
            }

            let added = session.absorb(std::mem::take(&mut visit.records));
            tracing::info!(
                "Page {}: {} items, {} new ({} total)",
                page_index,
                yielded,
                added,
                session.records().len()
            );

            if !visit.state.has_next {
                return session.finish(Termination::Done(DoneReason::EndOfResults));
            }
            if session.budget_spent() {
                return session.finish(Termination::Done(DoneReason::PageBudgetExhausted));
            }
            if limits
                .max_duration
                .is_some_and(|cap| session.elapsed() >= cap)
            {
                return session.finish(Termination::Done(DoneReason::TimeBudgetExhausted));
            }

            self.pacer.delay(DelayKind::BetweenPages).await;
            arrival = match self.navigator.advance(&visit).await {
                Ok(arrival) => arrival,
                Err(e) => return session.finish(Termination::Failed(e)),
            };
            page_index += 1;
        }
    }
}
