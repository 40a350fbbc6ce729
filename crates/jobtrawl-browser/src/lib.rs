//! Browser automation layer for the jobtrawl crawler.
//!
//! Defines the [`BrowserActions`] driver contract the crawl engine is written
//! against, and [`BrowserEngine`], its headless Chrome implementation with a
//! randomized launch fingerprint.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use actions::BrowserActions;
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
