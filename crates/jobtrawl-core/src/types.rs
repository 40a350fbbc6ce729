//! Shared types used across the jobtrawl workspace.
//!
//! This module defines the crawl output record, the sentinel-aware field
//! wrapper every record field is stored in, and the search query model.

use crate::error::CoreError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A single extracted value, or one of two sentinels.
///
/// `Unknown` means the item was healthy but this field could not be found.
/// `Error` means the item was observed but its detail view could not be
/// read at all, so the field was never attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Successfully extracted value
    Value(T),
    /// Field absent on an otherwise healthy item
    Unknown,
    /// Item observed but undiagnosable
    Error,
}

impl<T> Field<T> {
    /// Wrap an optional value, mapping `None` to `Unknown`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Unknown, Self::Value)
    }

    /// Borrow the extracted value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unknown | Self::Error => None,
        }
    }

    /// Whether a value was extracted.
    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Whether the field is the `Unknown` sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether the field is the `Error` sentinel.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Map the inner value, preserving sentinels.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Self::Value(v) => Field::Value(f(v)),
            Self::Unknown => Field::Unknown,
            Self::Error => Field::Error,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Field<String> {
    /// Borrow the extracted string, if any.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.value().map(String::as_str)
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Unknown => f.write_str("Unknown"),
            Self::Error => f.write_str("Error"),
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Unknown => serializer.serialize_str("Unknown"),
            Self::Error => serializer.serialize_str("Error"),
        }
    }
}

/// Workplace arrangement of a posting.
///
/// Discriminants are the site's `f_WT` filter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkplaceMode {
    /// On-site
    OnSite = 1,
    /// Remote
    Remote = 2,
    /// Hybrid
    Hybrid = 3,
}

impl WorkplaceMode {
    /// All modes, in keyword scan order.
    pub const ALL: [Self; 3] = [Self::OnSite, Self::Remote, Self::Hybrid];

    /// Numeric filter code used in search URLs.
    #[must_use]
    pub fn filter_code(self) -> u8 {
        self as u8
    }

    /// Label as rendered in the posting insight text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::OnSite => "On-site",
            Self::Remote => "Remote",
            Self::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for WorkplaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Experience level of a posting.
///
/// Discriminants are the site's `f_E` filter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Seniority {
    /// Internship
    Internship = 1,
    /// Entry level
    Entry = 2,
    /// Associate
    Associate = 3,
    /// Mid-Senior level
    MidSenior = 4,
    /// Director
    Director = 5,
    /// Executive
    Executive = 6,
}

impl Seniority {
    /// All levels, in keyword scan order.
    pub const ALL: [Self; 6] = [
        Self::Internship,
        Self::Entry,
        Self::Associate,
        Self::MidSenior,
        Self::Director,
        Self::Executive,
    ];

    /// Numeric filter code used in search URLs.
    #[must_use]
    pub fn filter_code(self) -> u8 {
        self as u8
    }

    /// Label as rendered in the posting insight text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Internship => "Internship",
            Self::Entry => "Entry level",
            Self::Associate => "Associate",
            Self::MidSenior => "Mid-Senior level",
            Self::Director => "Director",
            Self::Executive => "Executive",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One job posting as extracted from the result list.
///
/// Every field is either a value or a sentinel; construction never fails.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Record {
    /// Canonical posting URL, stable across scrapes
    pub source_url: Field<String>,
    /// Posting title, first line only
    pub title: Field<String>,
    /// Hiring company name
    pub organization: Field<String>,
    /// Company page URL
    pub organization_url: Field<String>,
    /// Free-text location
    pub location: Field<String>,
    /// Raw posting age text, e.g. "2 days ago"
    pub posted_at: Field<String>,
    /// Raw applicant text, e.g. "87 applicants"
    pub applicant_count: Field<String>,
    /// Raw description body
    pub description: Field<String>,
    /// Raw salary/benefits card text
    pub benefits: Field<String>,
    /// Workplace arrangement found in the insight text
    pub workplace_mode: Field<WorkplaceMode>,
    /// Experience level found in the insight text
    pub seniority: Field<Seniority>,
}

impl Record {
    /// Canonical URL used as the deduplication key, if one was extracted.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.source_url.as_deref()
    }
}

/// Search parameters for one crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text keywords
    pub term: String,
    /// Site geo identifier (e.g. 90009834 for Poland)
    pub location_id: u64,
    /// Optional workplace filter
    #[serde(default)]
    pub workplace_modes: Vec<WorkplaceMode>,
    /// Optional experience level filter
    #[serde(default)]
    pub seniorities: Vec<Seniority>,
}

impl SearchQuery {
    /// Create a query without filters.
    ///
    /// # Errors
    /// Returns error if the search term is blank.
    pub fn new(term: impl Into<String>, location_id: u64) -> Result<Self, CoreError> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(CoreError::Validation(
                "search term must not be empty".to_string(),
            ));
        }

        Ok(Self {
            term,
            location_id,
            workplace_modes: Vec::new(),
            seniorities: Vec::new(),
        })
    }

    /// Restrict results to the given workplace modes.
    #[must_use]
    pub fn with_workplace_modes(mut self, modes: impl IntoIterator<Item = WorkplaceMode>) -> Self {
        self.workplace_modes = modes.into_iter().collect();
        self
    }

    /// Restrict results to the given experience levels.
    #[must_use]
    pub fn with_seniorities(mut self, levels: impl IntoIterator<Item = Seniority>) -> Self {
        self.seniorities = levels.into_iter().collect();
        self
    }
}
