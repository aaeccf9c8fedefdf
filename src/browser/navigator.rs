use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use url::Url;

use super::{BrowserSession, ClickTarget};
use crate::config::BrowserConfig;
use crate::error::InteractionError;

pub const REGION_POPUP_SELECTOR: &str = "#shop-country-options";
pub const METRIC_SWITCH_SELECTOR: &str = "#spec-cm-tab-switch";
pub const SPEC_ROW_SELECTOR: &str = "#spec-cm-tab tr";
pub const GALLERY_IMAGE_SELECTOR: &str = ".fotorama__img";

#[derive(Debug, Clone)]
pub struct NavigatorSettings {
    pub settle_delay: Duration,
    pub poll_interval: Duration,
    pub popup_timeout: Duration,
    pub metric_timeout: Duration,
    pub retry_attempts: u32,
    pub retry_budget: Duration,
}

impl From<&BrowserConfig> for NavigatorSettings {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            poll_interval: config.poll_interval(),
            popup_timeout: config.popup_timeout(),
            metric_timeout: config.metric_timeout(),
            retry_attempts: config.retry_attempts.max(1),
            retry_budget: config.retry_budget(),
        }
    }
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

/// Opens product detail pages and brings the specification tab into the
/// metric view.
pub struct DetailNavigator<B> {
    session: B,
    base_url: Url,
    settings: NavigatorSettings,
}

impl<B: BrowserSession> DetailNavigator<B> {
    pub fn new(session: B, base_url: Url, settings: NavigatorSettings) -> Self {
        Self {
            session,
            base_url,
            settings,
        }
    }

    pub fn session(&self) -> &B {
        &self.session
    }

    pub fn into_session(self) -> B {
        self.session
    }

    /// `base_url + path`. Absolute links are used as they are, and a path
    /// prefix on `base_url` is kept whether or not `path` starts with `/`.
    pub fn detail_url(&self, path: &str) -> Result<Url, InteractionError> {
        if let Ok(absolute) = Url::parse(path) {
            return Ok(absolute);
        }

        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| InteractionError::Navigation(format!("{}: {}", joined, e)))
    }

    /// Navigate to the detail page at `path` and switch it to metric units.
    ///
    /// Only `NotInteractable` and `ClickIntercepted` trigger another attempt,
    /// bounded by both the attempt ceiling and the wall-clock budget.
    pub async fn open_detail(&self, path: &str) -> Result<(), InteractionError> {
        let url = self.detail_url(path)?;
        let started = Instant::now();
        let mut attempt = 1;

        loop {
            match self.try_open(url.as_str()).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable()
                    && attempt < self.settings.retry_attempts
                    && started.elapsed() < self.settings.retry_budget =>
                {
                    warn!(
                        "Interaction blocked on {} (attempt {}/{}): {}",
                        url, attempt, self.settings.retry_attempts, e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_open(&self, url: &str) -> Result<(), InteractionError> {
        debug!("Opening detail page {}", url);
        self.session.navigate(url).await?;

        sleep(self.settings.settle_delay).await;

        // Regional selection interstitial
        if self.session.count(REGION_POPUP_SELECTOR).await? > 0 {
            info!("Found region pop-up on {}, dismissing", url);
            self.wait_and_click(&ClickTarget::BlankButton, self.settings.popup_timeout)
                .await?;
        }

        self.wait_and_click(
            &ClickTarget::Css(METRIC_SWITCH_SELECTOR.to_string()),
            self.settings.metric_timeout,
        )
        .await
    }

    async fn wait_and_click(
        &self,
        target: &ClickTarget,
        timeout: Duration,
    ) -> Result<(), InteractionError> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.session.is_clickable(target).await? {
                return self.session.click(target).await;
            }
            if Instant::now() >= deadline {
                return Err(InteractionError::Timeout {
                    what: target.to_string(),
                    after: timeout,
                });
            }
            sleep(self.settings.poll_interval).await;
        }
    }

    /// Text of every row of the metric specification table.
    pub async fn spec_rows(&self) -> Result<Vec<String>, InteractionError> {
        self.session.texts(SPEC_ROW_SELECTOR).await
    }

    /// Full-size gallery image of the current detail page, if any.
    pub async fn gallery_image(&self) -> Result<Option<String>, InteractionError> {
        Ok(self
            .session
            .attribute(GALLERY_IMAGE_SELECTOR, "src")
            .await?
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty()))
    }
}
