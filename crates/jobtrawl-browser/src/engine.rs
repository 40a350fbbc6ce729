use crate::actions::BrowserActions;
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures_util::stream::StreamExt;
use jobtrawl_core::BrowserConfig;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Interval between element lookups while waiting
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Headless Chrome driven over the DevTools protocol.
///
/// Owns a single tab; the crawler drives it exclusively.
pub struct BrowserEngine {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl BrowserEngine {
    /// Launch a browser with the given settings and open one blank tab
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let fingerprint = FingerprintConfig::from_config(config);
        let navigation_timeout = Duration::from_secs(config.navigation_timeout_secs);

        let mut builder = CdpBrowserConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .request_timeout(navigation_timeout);

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(dir) = &config.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        if let Some(executable) = &config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        if let Some(user_agent) = &fingerprint.user_agent {
            builder = builder.arg(format!("--user-agent={user_agent}"));
        }

        let cdp_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| classify(&e, "open tab"))?;

        tracing::info!(
            "Browser launched ({}x{}, headless: {})",
            fingerprint.viewport_width,
            fingerprint.viewport_height,
            config.headless
        );

        Ok(Self {
            browser,
            page,
            handler,
            navigation_timeout,
        })
    }

    /// Close the browser and wait for the event handler to drain
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| classify(&e, "close browser"))?;
        let _ = self.handler.await;
        tracing::info!("Browser closed");
        Ok(())
    }

    async fn query(&self, selector: &str, scope: Option<&Element>) -> Result<Element> {
        let found = match scope {
            Some(parent) => parent.find_element(selector).await,
            None => self.page.find_element(selector).await,
        };
        found.map_err(|e| classify(&e, selector))
    }

    async fn query_all(&self, selector: &str, scope: Option<&Element>) -> Result<Vec<Element>> {
        let found = match scope {
            Some(parent) => parent.find_elements(selector).await,
            None => self.page.find_elements(selector).await,
        };
        found.map_err(|e| classify(&e, selector))
    }
}

/// Map a CDP error onto the driver error taxonomy
fn classify(err: &CdpError, context: &str) -> BrowserError {
    match err {
        CdpError::Timeout => BrowserError::Timeout(context.to_string()),
        CdpError::NotFound => BrowserError::SelectorNotFound(context.to_string()),
        CdpError::Ws(_) | CdpError::ChannelSendError(_) => {
            BrowserError::SessionLost(format!("{context}: {err}"))
        }
        _ => BrowserError::ChromiumError(format!("{context}: {err}")),
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    type Handle = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => match classify(&e, url) {
                BrowserError::ChromiumError(msg) => Err(BrowserError::NavigationError(msg)),
                other => Err(other),
            },
            Err(_) => Err(BrowserError::Timeout(format!("navigation to {url}"))),
        }
    }

    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(|e| classify(&e, "current url"))?
            .ok_or_else(|| BrowserError::NavigationError("document has no URL".to_string()))
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        scope: Option<&Element>,
        timeout: Duration,
    ) -> Result<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.query(selector, scope).await {
                Ok(element) => return Ok(element),
                Err(e) if e.is_session_lost() => return Err(e),
                Err(_) if Instant::now() >= deadline => {
                    return Err(BrowserError::Timeout(selector.to_string()))
                }
                Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    async fn wait_for_all_elements(
        &self,
        selector: &str,
        scope: Option<&Element>,
        timeout: Duration,
    ) -> Result<Vec<Element>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.query_all(selector, scope).await {
                Ok(elements) if !elements.is_empty() => return Ok(elements),
                Err(e) if e.is_session_lost() => return Err(e),
                _ if Instant::now() >= deadline => {
                    return Err(BrowserError::Timeout(selector.to_string()))
                }
                _ => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    async fn find_element(&self, scope: &Element, selector: &str) -> Result<Element> {
        self.query(selector, Some(scope)).await
    }

    async fn find_all_elements(&self, scope: &Element, selector: &str) -> Result<Vec<Element>> {
        self.query_all(selector, Some(scope)).await
    }

    async fn text(&self, handle: &Element) -> Result<String> {
        let text = handle
            .inner_text()
            .await
            .map_err(|e| classify(&e, "inner text"))?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, handle: &Element, name: &str) -> Result<Option<String>> {
        handle
            .attribute(name)
            .await
            .map_err(|e| classify(&e, name))
    }

    async fn click(&self, handle: &Element) -> Result<()> {
        handle
            .click()
            .await
            .map(|_| ())
            .map_err(|e| classify(&e, "click"))
    }

    async fn scroll_viewport(&self, fraction: f64) -> Result<()> {
        let script = format!(
            "window.scrollTo(0, Math.floor(document.body.scrollHeight * {fraction}))"
        );
        self.page
            .evaluate(script)
            .await
            .map(|_| ())
            .map_err(|e| classify(&e, "scroll"))
    }

    async fn wait_for_stale(&self, handle: &Element, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            match handle
                .call_js_fn("function() { return this.isConnected; }", false)
                .await
            {
                Ok(ret) => {
                    let connected = ret
                        .result
                        .value
                        .as_ref()
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    if !connected {
                        return Ok(true);
                    }
                }
                Err(e) => {
                    let err = classify(&e, "stale check");
                    if err.is_session_lost() {
                        return Err(err);
                    }
                    // The remote object was released with its node
                    return Ok(true);
                }
            }

            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
