use jobtrawl_browser::BrowserError;
use thiserror::Error;

/// Crawl-level failures. Only these ever end a crawl in `Failed`.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("navigation to result page {page_index} failed: {source}")]
    Navigation {
        page_index: usize,
        #[source]
        source: BrowserError,
    },

    #[error("browser session lost on result page {page_index}: {source}")]
    SessionLost {
        page_index: usize,
        #[source]
        source: BrowserError,
    },

    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{what} not found: {source}")]
    ContainerMissing {
        what: &'static str,
        #[source]
        source: BrowserError,
    },
}

impl ScanError {
    /// Result page the failure happened on, when it is tied to one.
    #[must_use]
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Self::Navigation { page_index, .. } | Self::SessionLost { page_index, .. } => {
                Some(*page_index)
            }
            Self::InvalidBaseUrl { .. } | Self::ContainerMissing { .. } => None,
        }
    }

    /// Classify a browser error raised while working on `page_index`.
    pub(crate) fn from_browser(page_index: usize, source: BrowserError) -> Self {
        if source.is_session_lost() {
            Self::SessionLost { page_index, source }
        } else {
            Self::Navigation { page_index, source }
        }
    }
}

/// Why one extraction strategy produced nothing. Never leaves field extraction.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("no element matches {0}")]
    Missing(String),

    #[error("element {selector} has no {attribute} attribute")]
    MissingAttribute {
        selector: String,
        attribute: &'static str,
    },

    #[error("fragment #{index} of {selector} not present")]
    MissingFragment { selector: String, index: usize },

    #[error("no text matched {0}")]
    NoMatch(&'static str),

    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
}

pub type Result<T> = std::result::Result<T, ScanError>;
