//! jobtrawl Core - Foundation crate for the jobtrawl crawler.
//!
//! This crate provides the shared record model, error handling, and
//! configuration management that the browser and scanner crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - `Record`, the `Field` sentinel wrapper, and the search query model
//!
//! # Example
//!
//! ```rust
//! use jobtrawl_core::{AppConfig, Field, Record};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let query = config.search.to_query()?;
//! assert_eq!(query.location_id, 90_009_834);
//!
//! let record = Record::default();
//! assert_eq!(record.title, Field::Unknown);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, CrawlConfig, PacingConfig, SearchConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{Field, Record, SearchQuery, Seniority, WorkplaceMode};
