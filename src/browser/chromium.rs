use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{BrowserSession, ClickTarget};
use crate::config::BrowserConfig;
use crate::error::InteractionError;

const VISIBLE_AND_ENABLED_JS: &str = "function() { \
    const r = this.getBoundingClientRect(); \
    const s = window.getComputedStyle(this); \
    return !this.disabled && r.width > 0 && r.height > 0 \
        && s.visibility !== 'hidden' && s.display !== 'none'; }";

/// Headless Chromium tab driven over CDP.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    request_timeout: Duration,
}

impl ChromiumSession {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        info!("Launching Chromium session");

        let mut builder = CdpBrowserConfig::builder()
            .window_size(1280, 1024)
            .request_timeout(config.request_timeout())
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(ref chrome_path) = config.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser tab")?;

        Ok(Self {
            browser,
            page,
            handler,
            request_timeout: config.request_timeout(),
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            error!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        info!("Browser shutdown complete");
    }

    /// Every element matching `selector`; no match is an empty list.
    async fn find_all(&self, selector: &str) -> Result<Vec<Element>, InteractionError> {
        match self.page.find_elements(selector).await {
            Ok(elements) => Ok(elements),
            Err(CdpError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(classify(e, selector, self.request_timeout)),
        }
    }

    async fn find_target(&self, target: &ClickTarget) -> Result<Option<Element>, InteractionError> {
        match target {
            ClickTarget::Css(selector) => Ok(self.find_all(selector).await?.into_iter().next()),
            ClickTarget::BlankButton => {
                for button in self.find_all("button").await? {
                    let text = button
                        .inner_text()
                        .await
                        .map_err(|e| classify(e, "button", self.request_timeout))?
                        .unwrap_or_default();
                    if text.trim().is_empty() {
                        return Ok(Some(button));
                    }
                }
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<(), InteractionError> {
        debug!(url = %url, "Navigating");
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| classify(e, url, self.request_timeout))
    }

    async fn count(&self, selector: &str) -> Result<usize, InteractionError> {
        let elements = self.find_all(selector).await?;
        Ok(elements.len())
    }

    async fn is_clickable(&self, target: &ClickTarget) -> Result<bool, InteractionError> {
        let Some(element) = self.find_target(target).await? else {
            return Ok(false);
        };

        let returns = element
            .call_js_fn(VISIBLE_AND_ENABLED_JS, false)
            .await
            .map_err(|e| classify(e, &target.to_string(), self.request_timeout))?;

        Ok(returns
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn click(&self, target: &ClickTarget) -> Result<(), InteractionError> {
        let element = self
            .find_target(target)
            .await?
            .ok_or_else(|| InteractionError::ElementMissing(target.to_string()))?;

        element
            .click()
            .await
            .map(|_| ())
            .map_err(|e| classify_click(e, &target.to_string(), self.request_timeout))
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, InteractionError> {
        let elements = self.find_all(selector).await?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element
                .inner_text()
                .await
                .map_err(|e| classify(e, selector, self.request_timeout))?;
            texts.push(text.unwrap_or_default());
        }
        Ok(texts)
    }

    async fn attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, InteractionError> {
        let elements = self.find_all(selector).await?;

        match elements.first() {
            Some(element) => element
                .attribute(name)
                .await
                .map_err(|e| classify(e, selector, self.request_timeout)),
            None => Ok(None),
        }
    }
}

fn classify(error: CdpError, what: &str, request_timeout: Duration) -> InteractionError {
    let message = error.to_string();
    match error {
        CdpError::Timeout => InteractionError::Timeout {
            what: what.to_string(),
            after: request_timeout,
        },
        CdpError::NotFound => InteractionError::ElementMissing(what.to_string()),
        CdpError::Ws(_) | CdpError::NoResponse => InteractionError::Session(message),
        CdpError::ScrollingFailed(_) => {
            InteractionError::NotInteractable(format!("{}: {}", what, message))
        }
        CdpError::Chrome(_) | CdpError::ChromeMessage(_)
            if message.contains("not visible") || message.contains("box model") =>
        {
            InteractionError::NotInteractable(format!("{}: {}", what, message))
        }
        _ => InteractionError::Navigation(format!("{}: {}", what, message)),
    }
}

/// Click failures: only a click that lands on another element is
/// `ClickIntercepted`; everything else keeps its general classification.
fn classify_click(error: CdpError, what: &str, request_timeout: Duration) -> InteractionError {
    match classify(error, what, request_timeout) {
        InteractionError::Navigation(msg) if is_click_blocked(&msg) => {
            InteractionError::ClickIntercepted(msg)
        }
        other => other,
    }
}

fn is_click_blocked(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["clickable point", "intercept", "covered", "obscured", "not visible"]
        .iter()
        .any(|needle| message.contains(needle))
}
