use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("stale element: {0}")]
    StaleElement(String),

    #[error("browser session lost: {0}")]
    SessionLost(String),
}

impl BrowserError {
    /// Whether the underlying session is gone and no further action can succeed.
    #[must_use]
    pub fn is_session_lost(&self) -> bool {
        matches!(self, Self::SessionLost(_))
    }

    /// Whether a bounded wait ran out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
