//! jobtrawl Scanner - Paginated job search extraction.
//!
//! This crate drives a browser session through a paginated, client-rendered
//! job search result list and turns every item card into a [`Record`],
//! isolating DOM failures to the field or item they occur in.
//!
//! # Features
//!
//! - Page traversal state machine with URL fallback when pagination clicks misfire
//! - Ordered per-field fallback chains; a missing field never fails a record
//! - Jittered pacing between scrolls, items and pages
//! - Deduplication by canonical posting URL across pages
//! - Recommended-jobs board and standalone posting scrapes
//!
//! # Example
//!
//! ```rust,ignore
//! use jobtrawl_browser::BrowserEngine;
//! use jobtrawl_core::AppConfig;
//! use jobtrawl_scanner::JobSearch;
//! use std::time::Duration;
//!
//! let config = AppConfig::load()?;
//! let engine = BrowserEngine::launch(&config.browser).await?;
//! let mut search = JobSearch::from_config(engine, &config)?;
//!
//! let query = config.search.to_query()?;
//! let report = search
//!     .search_all_pages(&query, config.search.max_pages, Duration::from_secs(3))
//!     .await;
//! println!("{} records", report.records.len());
//! ```
//!
//! [`Record`]: jobtrawl_core::Record

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod accumulator;
#[allow(missing_docs)]
pub mod buckets;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod extractor;
#[allow(missing_docs)]
pub mod fallback;
#[allow(missing_docs)]
pub mod navigator;
#[allow(missing_docs)]
pub mod pacing;
#[allow(missing_docs)]
pub mod search;
#[allow(missing_docs)]
pub mod selectors;
#[allow(missing_docs)]
pub mod settings;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use accumulator::{CrawlLimits, CrawlReport, CrawlSession, DoneReason, Termination};
pub use buckets::{BucketKind, RecommendedJobs};
pub use error::{ExtractionFailure, Result, ScanError};
pub use extractor::{canonical_job_url, normalize_title, RecordExtractor};
pub use fallback::FallbackChain;
pub use navigator::{Arrival, NavState, PageNavigator, PageState};
pub use pacing::{DelayKind, Pacer, PacingController};
pub use search::JobSearch;
pub use selectors::SelectorSet;
pub use settings::CrawlSettings;
pub use url_builder::build_search_url;
