use crate::error::Result;
use std::time::Duration;

/// Browser actions the crawler needs from a driver.
///
/// Selectors are CSS. Element handles are driver-specific; a handle may go
/// stale once the page re-renders, after which element calls fail with
/// [`BrowserError::StaleElement`](crate::BrowserError::StaleElement).
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Element handle type
    type Handle: Send + Sync;

    /// Navigate to a URL and wait for the load event
    async fn navigate(&self, url: &str) -> Result<()>;

    /// URL of the current document
    async fn current_url(&self) -> Result<String>;

    /// Wait until an element matching `selector` exists under `scope` (or the document)
    async fn wait_for_element(
        &self,
        selector: &str,
        scope: Option<&Self::Handle>,
        timeout: Duration,
    ) -> Result<Self::Handle>;

    /// Wait until at least one element matches, then return all matches in document order
    async fn wait_for_all_elements(
        &self,
        selector: &str,
        scope: Option<&Self::Handle>,
        timeout: Duration,
    ) -> Result<Vec<Self::Handle>>;

    /// Find the first descendant of `scope` matching `selector`
    async fn find_element(&self, scope: &Self::Handle, selector: &str) -> Result<Self::Handle>;

    /// Find all descendants of `scope` matching `selector`
    async fn find_all_elements(
        &self,
        scope: &Self::Handle,
        selector: &str,
    ) -> Result<Vec<Self::Handle>>;

    /// Rendered text of an element
    async fn text(&self, handle: &Self::Handle) -> Result<String>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, handle: &Self::Handle, name: &str) -> Result<Option<String>>;

    /// Click an element
    async fn click(&self, handle: &Self::Handle) -> Result<()>;

    /// Scroll the viewport to a fraction of the scrollable height
    async fn scroll_viewport(&self, fraction: f64) -> Result<()>;

    /// Wait until `handle` is detached from the document.
    ///
    /// Returns `false` if it is still attached when `timeout` elapses.
    async fn wait_for_stale(&self, handle: &Self::Handle, timeout: Duration) -> Result<bool>;
}
